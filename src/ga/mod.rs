//! Genetic timetable search.
//!
//! A generational GA over requirement-indexed chromosomes, seeded with
//! the greedy placement.
//!
//! # Encoding
//!
//! One gene per session requirement holding an index into its
//! eligibility list, or "unassigned". The population is a flat
//! `Vec` of fixed-length gene arrays.
//!
//! # Submodules
//!
//! - [`operators`]: uniform crossover and reassign mutation
//! - [`runner`]: the problem-agnostic generational loop
//!
//! # Hard constraints
//!
//! Double-booking and teacher ceilings are penalized, not forbidden,
//! while evolving. The strategy returns the fittest chromosome that
//! violates neither.
//!
//! # Reference
//! - Burke, Elliman & Weare (1994), "A genetic algorithm based university
//!   timetabling system"
//! - Goldberg (1989), "Genetic Algorithms in Search, Optimization and
//!   Machine Learning"

mod chromosome;
pub mod operators;
mod problem;
pub mod runner;

pub use chromosome::TimetableChromosome;
pub use problem::{FitnessBreakdown, FitnessWeights, TimetableGaProblem};
pub use runner::{GaConfig, GaProblem, GaResult, GaRunner, Individual};

use tracing::debug;

use crate::dispatching::RuleEngine;
use crate::eligibility::EligibilityIndex;
use crate::scheduler::{
    Algorithm, GreedyStrategy, Placement, SearchBudget, SearchStrategy, StrategyOutcome,
};

/// Genetic search strategy.
///
/// # Example
/// ```
/// use u_timetable::ga::{GaConfig, GeneticStrategy};
///
/// let strategy = GeneticStrategy::new(GaConfig::default().with_seed(7));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GeneticStrategy {
    config: GaConfig,
    weights: FitnessWeights,
    rules: RuleEngine,
}

impl GeneticStrategy {
    /// Creates a genetic strategy with default fitness weights.
    pub fn new(config: GaConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Sets the fitness weights.
    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the ordering used by the greedy seed.
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// GA parameters.
    pub fn config(&self) -> &GaConfig {
        &self.config
    }
}

impl SearchStrategy for GeneticStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Genetic
    }

    fn generate(&self, index: &EligibilityIndex<'_>, budget: &SearchBudget) -> StrategyOutcome {
        let seed = GreedyStrategy::new()
            .with_rules(self.rules.clone())
            .generate(index, &budget.without_iteration_cap())
            .placement;

        let problem = TimetableGaProblem::new(index)
            .with_weights(self.weights.clone())
            .with_mutation_rate(self.config.mutation_rate)
            .with_seed(seed);
        let result = GaRunner::run(&problem, &self.config, budget);

        debug!(
            generations = result.generations,
            fitness = result.best_fitness,
            termination = ?result.termination,
            "genetic search finished"
        );
        // The greedy seed is always feasible.
        let best = result.best_feasible.unwrap_or_else(|| {
            TimetableChromosome::from_placement(&Placement::empty(index.len()))
        });
        StrategyOutcome {
            placement: best.to_placement(),
            iterations: result.generations,
            termination: result.termination,
        }
    }
}
