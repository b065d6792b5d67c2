//! Genetic operators for timetable chromosomes.
//!
//! - [`uniform_crossover`]: per-gene swap between two parents.
//! - [`reassign_mutation`]: per-gene reassignment within the
//!   eligibility list, occasionally to "unassigned".
//!
//! Both preserve chromosome length and gene validity.

use rand::Rng;

use super::chromosome::TimetableChromosome;
use crate::eligibility::EligibilityIndex;

/// Probability that a mutating gene is cleared instead of reassigned.
pub const UNASSIGN_PROBABILITY: f64 = 0.1;

/// Uniform crossover: each gene position is swapped with probability 0.5.
///
/// # Reference
/// Syswerda (1989), "Uniform crossover in genetic algorithms"
pub fn uniform_crossover<R: Rng>(
    p1: &TimetableChromosome,
    p2: &TimetableChromosome,
    rng: &mut R,
) -> (TimetableChromosome, TimetableChromosome) {
    let mut c1 = p1.genes.clone();
    let mut c2 = p2.genes.clone();
    let len = c1.len().min(c2.len());
    for i in 0..len {
        if rng.random_bool(0.5) {
            std::mem::swap(&mut c1[i], &mut c2[i]);
        }
    }
    (
        TimetableChromosome {
            genes: c1,
            fitness: f64::INFINITY,
        },
        TimetableChromosome {
            genes: c2,
            fitness: f64::INFINITY,
        },
    )
}

/// Reassign mutation: each gene mutates with probability `rate`.
///
/// A mutating gene is cleared with [`UNASSIGN_PROBABILITY`]; otherwise it
/// moves to a different candidate of its eligibility list. Genes of
/// infeasible requirements stay unassigned.
pub fn reassign_mutation<R: Rng>(
    chromosome: &mut TimetableChromosome,
    index: &EligibilityIndex<'_>,
    rate: f64,
    rng: &mut R,
) {
    let rate = rate.clamp(0.0, 1.0);
    for (req, gene) in chromosome.genes.iter_mut().enumerate() {
        if !rng.random_bool(rate) {
            continue;
        }
        let n = index.scarcity(req);
        if n == 0 {
            *gene = None;
            continue;
        }
        *gene = match *gene {
            Some(_) if rng.random_bool(UNASSIGN_PROBABILITY) => None,
            Some(current) if n > 1 => {
                // Draw from the n-1 other candidates.
                let pick = rng.random_range(0..n - 1);
                Some(if pick >= current { pick + 1 } else { pick })
            }
            Some(current) => Some(current),
            None => Some(rng.random_range(0..n)),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogSnapshot};
    use crate::models::{Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn snapshot() -> CatalogSnapshot {
        let mut catalog = Catalog::new()
            .with_course(Course::new("CS101", "CS").with_sessions_per_week(4))
            .with_teacher(Teacher::new("T1", "CS"))
            .with_teacher(Teacher::new("T2", "CS"))
            .with_room(Room::new("R1", 40, RoomType::Theory));
        for (i, day) in DayOfWeek::WEEKDAYS.iter().enumerate() {
            catalog = catalog.with_time_slot(TimeSlot::new(
                format!("S{i}"),
                *day,
                TimeOfDay::hm(9, 0),
                TimeOfDay::hm(10, 0),
            ));
        }
        CatalogSnapshot::unfiltered(catalog)
    }

    #[test]
    fn test_uniform_crossover_mixes_parents() {
        let p1 = TimetableChromosome {
            genes: vec![Some(0); 8],
            fitness: 1.0,
        };
        let p2 = TimetableChromosome {
            genes: vec![Some(1); 8],
            fitness: 2.0,
        };
        let mut rng = SmallRng::seed_from_u64(42);
        let (c1, c2) = uniform_crossover(&p1, &p2, &mut rng);

        assert_eq!(c1.genes.len(), 8);
        assert_eq!(c1.fitness, f64::INFINITY);
        // Every position keeps one gene from each parent
        for i in 0..8 {
            let mut pair = [c1.genes[i], c2.genes[i]];
            pair.sort();
            assert_eq!(pair, [Some(0), Some(1)]);
        }
    }

    #[test]
    fn test_mutation_keeps_validity() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ch = TimetableChromosome::random(&index, &mut rng);
        for _ in 0..100 {
            reassign_mutation(&mut ch, &index, 0.5, &mut rng);
            assert!(ch.is_valid(&index));
        }
    }

    #[test]
    fn test_full_rate_moves_every_assigned_gene() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let mut rng = SmallRng::seed_from_u64(3);
        let original = TimetableChromosome {
            genes: vec![Some(0), Some(1), Some(2), Some(3)],
            fitness: f64::INFINITY,
        };
        let mut ch = original.clone();
        reassign_mutation(&mut ch, &index, 1.0, &mut rng);
        for (before, after) in original.genes.iter().zip(&ch.genes) {
            assert_ne!(before, after);
        }
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let mut rng = SmallRng::seed_from_u64(42);
        let mut ch = TimetableChromosome::random(&index, &mut rng);
        let before = ch.clone();
        reassign_mutation(&mut ch, &index, 0.0, &mut rng);
        assert_eq!(ch, before);
    }
}
