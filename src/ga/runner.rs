//! Generational GA runner.
//!
//! A problem-agnostic loop over [`GaProblem`]: tournament selection,
//! crossover, mutation, elitism. Fitness follows the minimization
//! convention (lower = better).
//!
//! # Determinism
//! All randomness comes from one `SmallRng` seeded from the config and
//! is consumed only in the sequential phases. Fitness evaluation may run
//! on the rayon pool since it is a pure function of the individual.
//!
//! # Anytime behavior
//! The best individual seen is kept aside and elites survive unchanged,
//! so the best fitness never gets worse from one generation to the next.
//! The best individual that passes [`GaProblem::is_feasible`] is tracked
//! the same way.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::scheduler::{SearchBudget, Termination};

/// A member of the population.
pub trait Individual: Clone + Send + Sync {
    /// Cached fitness (lower = better).
    fn fitness(&self) -> f64;

    /// Stores an evaluated fitness.
    fn set_fitness(&mut self, fitness: f64);
}

/// Problem definition plugged into [`GaRunner`].
pub trait GaProblem: Sync {
    type Individual: Individual;

    /// Individuals placed in the initial population before random ones.
    fn seed_individuals(&self) -> Vec<Self::Individual> {
        Vec::new()
    }

    /// Creates a fresh individual.
    fn create_individual<R: Rng>(&self, rng: &mut R) -> Self::Individual;

    /// Evaluates fitness (lower = better). Must be pure.
    fn evaluate(&self, individual: &Self::Individual) -> f64;

    /// Recombines two parents into two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Individual,
        parent2: &Self::Individual,
        rng: &mut R,
    ) -> (Self::Individual, Self::Individual);

    /// Mutates an individual in place.
    fn mutate<R: Rng>(&self, individual: &mut Self::Individual, rng: &mut R);

    /// Whether an individual satisfies the hard constraints.
    fn is_feasible(&self, _individual: &Self::Individual) -> bool {
        true
    }
}

/// GA parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaConfig {
    /// Individuals per generation.
    pub population_size: usize,
    /// Generation cap when the budget has no iteration cap.
    pub max_generations: u64,
    /// Tournament size for parent selection.
    pub tournament_size: usize,
    /// Probability of recombining a selected pair.
    pub crossover_rate: f64,
    /// Per-gene mutation probability.
    pub mutation_rate: f64,
    /// Best individuals copied unchanged into the next generation.
    pub elite_count: usize,
    /// Generations without improvement before stopping (0 = never).
    pub plateau_generations: u64,
    /// RNG seed.
    pub seed: u64,
    /// Evaluate fitness on the rayon pool.
    pub parallel: bool,
}

impl Default for GaConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            max_generations: 200,
            tournament_size: 3,
            crossover_rate: 0.9,
            mutation_rate: 0.05,
            elite_count: 2,
            plateau_generations: 40,
            seed: 42,
            parallel: true,
        }
    }
}

impl GaConfig {
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size.max(2);
        self
    }

    pub fn with_max_generations(mut self, generations: u64) -> Self {
        self.max_generations = generations;
        self
    }

    pub fn with_tournament_size(mut self, size: usize) -> Self {
        self.tournament_size = size.max(1);
        self
    }

    pub fn with_crossover_rate(mut self, rate: f64) -> Self {
        self.crossover_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate.clamp(0.0, 1.0);
        self
    }

    pub fn with_elite_count(mut self, count: usize) -> Self {
        self.elite_count = count;
        self
    }

    pub fn with_plateau_generations(mut self, generations: u64) -> Self {
        self.plateau_generations = generations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Outcome of a GA run.
#[derive(Debug, Clone)]
pub struct GaResult<I> {
    /// Best individual seen.
    pub best: I,
    /// Its fitness.
    pub best_fitness: f64,
    /// Best feasible individual seen, if any.
    pub best_feasible: Option<I>,
    /// Generations completed.
    pub generations: u64,
    /// Best fitness after each generation (index 0 = initial population).
    pub history: Vec<f64>,
    /// Why the run stopped.
    pub termination: Termination,
}

/// Runs a [`GaProblem`] to termination.
pub struct GaRunner;

impl GaRunner {
    /// Runs the GA under `budget`.
    ///
    /// The budget's iteration cap, when set, replaces
    /// `config.max_generations`.
    pub fn run<P: GaProblem>(
        problem: &P,
        config: &GaConfig,
        budget: &SearchBudget,
    ) -> GaResult<P::Individual> {
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let size = config.population_size.max(2);

        let mut population: Vec<P::Individual> = problem.seed_individuals();
        population.truncate(size);
        while population.len() < size {
            population.push(problem.create_individual(&mut rng));
        }
        evaluate_all(problem, &mut population, config.parallel);

        let mut best = population[best_position(&population)].clone();
        let mut best_feasible = None;
        Self::track_feasible(problem, &population, &mut best_feasible);
        let mut history = vec![best.fitness()];
        let mut generations = 0u64;
        let mut stale = 0u64;

        let termination = loop {
            if let Some(reason) = budget.exhausted(generations) {
                break reason;
            }
            if budget.max_iterations().is_none() && generations >= config.max_generations {
                break Termination::Completed;
            }
            if config.plateau_generations > 0 && stale >= config.plateau_generations {
                break Termination::Plateau;
            }

            population = Self::next_generation(problem, config, &population, &mut rng);
            generations += 1;
            Self::track_feasible(problem, &population, &mut best_feasible);

            let leader = &population[best_position(&population)];
            if leader.fitness() < best.fitness() {
                debug!(
                    generation = generations,
                    fitness = leader.fitness(),
                    "ga improved"
                );
                best = leader.clone();
                stale = 0;
            } else {
                stale += 1;
            }
            trace!(generation = generations, best = best.fitness(), "ga generation");
            history.push(best.fitness());
        };

        GaResult {
            best_fitness: best.fitness(),
            best,
            best_feasible,
            generations,
            history,
            termination,
        }
    }

    /// Replaces `incumbent` with the fittest feasible individual that
    /// beats it. Only individuals fitter than the incumbent are checked.
    fn track_feasible<P: GaProblem>(
        problem: &P,
        population: &[P::Individual],
        incumbent: &mut Option<P::Individual>,
    ) {
        let bound = incumbent.as_ref().map_or(f64::INFINITY, |i| i.fitness());
        let mut ranked: Vec<usize> = (0..population.len())
            .filter(|&i| population[i].fitness() < bound)
            .collect();
        ranked.sort_by(|&a, &b| population[a].fitness().total_cmp(&population[b].fitness()));
        if let Some(&i) = ranked.iter().find(|&&i| problem.is_feasible(&population[i])) {
            *incumbent = Some(population[i].clone());
        }
    }

    fn next_generation<P: GaProblem, R: Rng>(
        problem: &P,
        config: &GaConfig,
        population: &[P::Individual],
        rng: &mut R,
    ) -> Vec<P::Individual> {
        let size = population.len();
        let mut ranked: Vec<usize> = (0..size).collect();
        ranked.sort_by(|&a, &b| population[a].fitness().total_cmp(&population[b].fitness()));

        let elite = config.elite_count.min(size);
        let mut next: Vec<P::Individual> = ranked[..elite]
            .iter()
            .map(|&i| population[i].clone())
            .collect();

        let mut children = Vec::with_capacity(size - elite);
        while children.len() < size - elite {
            let p1 = tournament(population, config.tournament_size, rng);
            let p2 = tournament(population, config.tournament_size, rng);
            let (mut c1, mut c2) = if rng.random_bool(config.crossover_rate.clamp(0.0, 1.0)) {
                problem.crossover(&population[p1], &population[p2], rng)
            } else {
                (population[p1].clone(), population[p2].clone())
            };
            problem.mutate(&mut c1, rng);
            problem.mutate(&mut c2, rng);
            children.push(c1);
            if children.len() < size - elite {
                children.push(c2);
            }
        }

        evaluate_all(problem, &mut children, config.parallel);
        next.extend(children);
        next
    }
}

/// Tournament selection: index of the fittest of `k` random picks.
pub fn tournament<I: Individual, R: Rng>(population: &[I], k: usize, rng: &mut R) -> usize {
    let mut winner = rng.random_range(0..population.len());
    for _ in 1..k.max(1) {
        let challenger = rng.random_range(0..population.len());
        if population[challenger].fitness() < population[winner].fitness() {
            winner = challenger;
        }
    }
    winner
}

fn evaluate_all<P: GaProblem>(problem: &P, individuals: &mut [P::Individual], parallel: bool) {
    if parallel {
        individuals
            .par_iter_mut()
            .for_each(|ind| ind.set_fitness(problem.evaluate(ind)));
    } else {
        for ind in individuals.iter_mut() {
            ind.set_fitness(problem.evaluate(ind));
        }
    }
}

fn best_position<I: Individual>(population: &[I]) -> usize {
    let mut best = 0;
    for (i, ind) in population.iter().enumerate().skip(1) {
        if ind.fitness() < population[best].fitness() {
            best = i;
        }
    }
    best
}
