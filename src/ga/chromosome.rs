//! Requirement-indexed chromosome.
//!
//! # Encoding
//!
//! One gene per session requirement, in requirement order. A gene holds
//! an index into that requirement's eligibility list, or `None` for
//! "unassigned". Genes never point outside their list, so every decoded
//! assignment satisfies the static rules; only double-booking and
//! workload can be violated.

use rand::Rng;

use super::runner::Individual;
use crate::eligibility::EligibilityIndex;
use crate::scheduler::Placement;

/// Fixed-length gene array for timetable GA.
///
/// Lower fitness = better timetable (minimization convention).
#[derive(Debug, Clone, PartialEq)]
pub struct TimetableChromosome {
    /// Candidate index per requirement.
    pub genes: Vec<Option<usize>>,
    /// Fitness value (lower = better).
    pub fitness: f64,
}

impl Individual for TimetableChromosome {
    fn fitness(&self) -> f64 {
        self.fitness
    }

    fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }
}

impl TimetableChromosome {
    /// Wraps a placement.
    pub fn from_placement(placement: &Placement) -> Self {
        Self {
            genes: placement.genes().to_vec(),
            fitness: f64::INFINITY,
        }
    }

    /// Creates a chromosome with a uniformly random candidate per gene.
    pub fn random<R: Rng>(index: &EligibilityIndex<'_>, rng: &mut R) -> Self {
        let genes = (0..index.len())
            .map(|req| {
                let n = index.scarcity(req);
                (n > 0).then(|| rng.random_range(0..n))
            })
            .collect();
        Self {
            genes,
            fitness: f64::INFINITY,
        }
    }

    /// Converts back into a placement.
    pub fn to_placement(&self) -> Placement {
        Placement::from_genes(self.genes.clone())
    }

    /// Number of assigned genes.
    pub fn assigned_count(&self) -> usize {
        self.genes.iter().filter(|g| g.is_some()).count()
    }

    /// Whether every gene fits its eligibility list.
    pub fn is_valid(&self, index: &EligibilityIndex<'_>) -> bool {
        self.genes.len() == index.len()
            && self
                .genes
                .iter()
                .enumerate()
                .all(|(req, g)| g.map_or(true, |c| c < index.scarcity(req)))
    }
}
