//! Timetable GA problem definition.
//!
//! Implements [`GaProblem`] over requirement-indexed chromosomes.
//!
//! # Fitness
//!
//! Minimized cost, the negation of the reward
//! `coverage_bonus · assigned − (double_booking · clash pairs + workload · violations)`:
//!
//! - a clash pair is two assigned genes sharing a teacher (or a room)
//!   in overlapping slots; a pair sharing both counts twice;
//! - a workload violation is a teacher whose weekly minutes fall outside
//!   their [min, max] band, counting idle teachers qualified for a
//!   course of the run.
//!
//! Double-booking is weighted heavier than workload imbalance. A
//! chromosome is feasible when it has no clash pair and no teacher above
//! their ceiling; the strategy only returns feasible chromosomes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::chromosome::TimetableChromosome;
use super::operators::{reassign_mutation, uniform_crossover};
use super::runner::GaProblem;
use crate::eligibility::{Candidate, EligibilityIndex};
use crate::scheduler::Placement;

/// Per-gene mutation rate used to diversify copies of the seed.
const SEED_PERTURBATION: f64 = 0.25;

/// Weights of the GA cost terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FitnessWeights {
    /// Penalty per teacher or room clash pair.
    pub double_booking: f64,
    /// Penalty per teacher outside their workload band.
    pub workload: f64,
    /// Reward per scheduled requirement.
    pub coverage_bonus: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            double_booking: 10.0,
            workload: 2.0,
            coverage_bonus: 5.0,
        }
    }
}

impl FitnessWeights {
    /// Cost of a breakdown (lower = better).
    pub fn cost(&self, b: &FitnessBreakdown) -> f64 {
        self.double_booking * b.double_bookings as f64 + self.workload * b.workload_violations as f64
            - self.coverage_bonus * b.assigned as f64
    }
}

/// Raw counts behind a fitness value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FitnessBreakdown {
    /// Scheduled requirements.
    pub assigned: usize,
    /// Teacher plus room clash pairs.
    pub double_bookings: usize,
    /// Teachers outside their workload band.
    pub workload_violations: usize,
    /// Teachers above their weekly ceiling.
    pub overloaded_teachers: usize,
}

impl FitnessBreakdown {
    /// No double-booking and no teacher above their ceiling.
    pub fn is_feasible(&self) -> bool {
        self.double_bookings == 0 && self.overloaded_teachers == 0
    }
}

/// GA problem for one eligibility index.
pub struct TimetableGaProblem<'i, 'a> {
    index: &'i EligibilityIndex<'a>,
    weights: FitnessWeights,
    mutation_rate: f64,
    seed: Option<Placement>,
    /// Teachers whose workload band applies even when idle.
    in_scope: Vec<bool>,
}

impl<'i, 'a> TimetableGaProblem<'i, 'a> {
    /// Creates a problem with default weights and no seed.
    pub fn new(index: &'i EligibilityIndex<'a>) -> Self {
        Self {
            index,
            weights: FitnessWeights::default(),
            mutation_rate: 0.05,
            seed: None,
            in_scope: (0..index.snapshot().teachers().len())
                .map(|t| index.snapshot().teaches_any_course(t))
                .collect(),
        }
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the per-gene mutation rate.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    /// Seeds the population with `placement` and perturbed copies of it.
    pub fn with_seed(mut self, placement: Placement) -> Self {
        self.seed = Some(placement);
        self
    }

    /// Counts what the fitness penalizes and rewards.
    pub fn breakdown(&self, chromosome: &TimetableChromosome) -> FitnessBreakdown {
        let snapshot = self.index.snapshot();
        let mut by_teacher: Vec<Vec<usize>> = vec![Vec::new(); snapshot.teachers().len()];
        let mut by_room: Vec<Vec<usize>> = vec![Vec::new(); snapshot.rooms().len()];
        let mut minutes = vec![0u32; snapshot.teachers().len()];
        let mut assigned = 0;

        for (req, gene) in chromosome.genes.iter().enumerate() {
            let Some(&Candidate { teacher, room, slot }) =
                gene.and_then(|c| self.index.candidates(req).get(c))
            else {
                continue;
            };
            assigned += 1;
            by_teacher[teacher].push(slot);
            by_room[room].push(slot);
            minutes[teacher] += self.index.slot_minutes(slot);
        }

        let double_bookings = by_teacher
            .iter()
            .chain(by_room.iter())
            .map(|slots| self.overlapping_pairs(slots))
            .sum();

        let mut workload_violations = 0;
        let mut overloaded_teachers = 0;
        for (t, (teacher, &m)) in snapshot.teachers().iter().zip(&minutes).enumerate() {
            if m > teacher.max_minutes() {
                overloaded_teachers += 1;
            }
            if (m > 0 || self.in_scope[t]) && (m < teacher.min_minutes() || m > teacher.max_minutes()) {
                workload_violations += 1;
            }
        }

        FitnessBreakdown {
            assigned,
            double_bookings,
            workload_violations,
            overloaded_teachers,
        }
    }

    fn overlapping_pairs(&self, slots: &[usize]) -> usize {
        let mut pairs = 0;
        for (i, &a) in slots.iter().enumerate() {
            for &b in &slots[i + 1..] {
                if self.index.slots_overlap(a, b) {
                    pairs += 1;
                }
            }
        }
        pairs
    }
}

impl GaProblem for TimetableGaProblem<'_, '_> {
    type Individual = TimetableChromosome;

    fn seed_individuals(&self) -> Vec<TimetableChromosome> {
        self.seed
            .iter()
            .map(TimetableChromosome::from_placement)
            .collect()
    }

    fn create_individual<R: Rng>(&self, rng: &mut R) -> TimetableChromosome {
        match &self.seed {
            Some(seed) => {
                let mut ch = TimetableChromosome::from_placement(seed);
                reassign_mutation(&mut ch, self.index, SEED_PERTURBATION, rng);
                ch
            }
            None => TimetableChromosome::random(self.index, rng),
        }
    }

    fn evaluate(&self, individual: &TimetableChromosome) -> f64 {
        self.weights.cost(&self.breakdown(individual))
    }

    fn crossover<R: Rng>(
        &self,
        parent1: &TimetableChromosome,
        parent2: &TimetableChromosome,
        rng: &mut R,
    ) -> (TimetableChromosome, TimetableChromosome) {
        uniform_crossover(parent1, parent2, rng)
    }

    fn mutate<R: Rng>(&self, individual: &mut TimetableChromosome, rng: &mut R) {
        reassign_mutation(individual, self.index, self.mutation_rate, rng);
    }

    fn is_feasible(&self, individual: &TimetableChromosome) -> bool {
        self.breakdown(individual).is_feasible()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogSnapshot};
    use crate::models::{Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    // One teacher (max 2h), two rooms, two overlapping Monday slots.
    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("CS101", "CS").with_sessions_per_week(3))
                .with_teacher(Teacher::new("T1", "CS").with_workload(0, 2))
                .with_room(Room::new("R1", 40, RoomType::Theory))
                .with_room(Room::new("R2", 50, RoomType::Theory))
                .with_time_slot(TimeSlot::new(
                    "A",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                ))
                .with_time_slot(TimeSlot::new(
                    "B",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 30),
                    TimeOfDay::hm(10, 30),
                ))
                .with_time_slot(TimeSlot::new(
                    "C",
                    DayOfWeek::Tuesday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                )),
        )
    }

    fn position(index: &EligibilityIndex<'_>, room: usize, slot: usize) -> Option<usize> {
        index
            .candidates(0)
            .iter()
            .position(|c| c.room == room && c.slot == slot)
    }

    #[test]
    fn test_breakdown_counts_clashes() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let problem = TimetableGaProblem::new(&index);

        // Same teacher, same room, same slot: teacher pair + room pair
        let same = position(&index, 0, 0);
        let ch = TimetableChromosome {
            genes: vec![same, same, None],
            fitness: f64::INFINITY,
        };
        let b = problem.breakdown(&ch);
        assert_eq!(b.assigned, 2);
        assert_eq!(b.double_bookings, 2);
        assert_eq!(b.workload_violations, 0);
        assert!(!b.is_feasible());

        // Different rooms, overlapping slots: teacher pair only
        let ch = TimetableChromosome {
            genes: vec![position(&index, 0, 0), position(&index, 1, 1), None],
            fitness: f64::INFINITY,
        };
        assert_eq!(problem.breakdown(&ch).double_bookings, 1);
    }

    #[test]
    fn test_workload_violation() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let problem = TimetableGaProblem::new(&index);
        // Three hours for a teacher capped at two
        let ch = TimetableChromosome {
            genes: vec![position(&index, 0, 0), position(&index, 0, 2), position(&index, 1, 1)],
            fitness: f64::INFINITY,
        };
        let b = problem.breakdown(&ch);
        assert_eq!(b.workload_violations, 1);
        assert_eq!(b.overloaded_teachers, 1);
        assert_eq!(b.assigned, 3);
        assert!(!problem.is_feasible(&ch));
    }

    #[test]
    fn test_idle_teacher_below_floor() {
        let snap = CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("CS101", "CS"))
                .with_teacher(Teacher::new("T1", "CS"))
                .with_teacher(Teacher::new("T2", "CS").with_workload(1, 4))
                .with_teacher(Teacher::new("T3", "MATH").with_workload(1, 4))
                .with_room(Room::new("R1", 40, RoomType::Theory))
                .with_time_slot(TimeSlot::new(
                    "A",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                )),
        );
        let index = EligibilityIndex::build(&snap);
        let problem = TimetableGaProblem::new(&index);
        let t1 = index.candidates(0).iter().position(|c| c.teacher == 0);

        // T2 could teach CS101 but is idle; T3 teaches nothing here
        let ch = TimetableChromosome {
            genes: vec![t1],
            fitness: f64::INFINITY,
        };
        let b = problem.breakdown(&ch);
        assert_eq!(b.workload_violations, 1);
        assert!(b.is_feasible());
    }

    #[test]
    fn test_cost_prefers_clean_coverage() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let problem = TimetableGaProblem::new(&index);

        let clean = TimetableChromosome {
            genes: vec![position(&index, 0, 0), position(&index, 0, 2), None],
            fitness: f64::INFINITY,
        };
        let clashing = TimetableChromosome {
            genes: vec![position(&index, 0, 0), position(&index, 1, 1), None],
            fitness: f64::INFINITY,
        };
        let empty = TimetableChromosome {
            genes: vec![None; 3],
            fitness: f64::INFINITY,
        };
        assert_eq!(problem.evaluate(&clean), -10.0);
        assert_eq!(problem.evaluate(&clashing), 0.0);
        assert_eq!(problem.evaluate(&empty), 0.0);
        assert!(problem.evaluate(&clean) < problem.evaluate(&clashing));
    }

    #[test]
    fn test_seeded_population() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let mut seed = Placement::empty(3);
        seed.set(0, Some(0));
        let problem = TimetableGaProblem::new(&index).with_seed(seed.clone());

        let seeds = problem.seed_individuals();
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].to_placement(), seed);

        let mut rng = SmallRng::seed_from_u64(42);
        let ch = problem.create_individual(&mut rng);
        assert!(ch.is_valid(&index));
    }
}
