//! Constraint-backtracking timetable search.
//!
//! Classic backtracking with forward checking over the eligibility
//! index. Each session requirement is a variable whose domain is its
//! candidate list.
//!
//! # Algorithm
//!
//! - **Variable ordering**: minimum remaining values, tie-broken by the
//!   number of unassigned requirements sharing a teacher or room.
//! - **Value ordering**: least constraining value, i.e. the candidate
//!   that removes the fewest values from neighboring domains.
//! - **Propagation**: after each assignment, remove from unassigned
//!   neighbors every candidate that would double-book the teacher or
//!   room, or push the teacher past their weekly ceiling.
//! - **Backtracking**: on a domain wipe-out, rewind to the latest choice
//!   point with values left.
//!
//! Requirements with an empty candidate list are left out of the search.
//!
//! # Anytime result
//!
//! Every partial placement that assigns more requirements than any
//! before it is completed greedily (when enabled), scored with the
//! quality model, and kept if it outranks the best so far. The empty
//! placement is scored first, so the result is never below a greedy
//! pass in the same order. The search is deterministic, so a larger
//! node budget only adds candidates and never lowers the score.
//!
//! # Reference
//! - Haralick & Elliott (1980), "Increasing tree search efficiency for
//!   constraint satisfaction problems"
//! - Baptiste et al. (2001), "Constraint-Based Scheduling"

mod domain;
mod search;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conflict::ConflictDetector;
use crate::dispatching::RuleEngine;
use crate::eligibility::EligibilityIndex;
use crate::quality::{Metrics, QualityModel, QualityScorer, WeightedQuality};
use crate::scheduler::{
    fill, Algorithm, Placement, SearchBudget, SearchStrategy, StrategyOutcome,
};

/// Backtracking parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CpConfig {
    /// Node cap when the budget has no iteration cap.
    pub max_nodes: u64,
    /// Fill requirements the search left open with a greedy pass.
    pub complete_greedily: bool,
}

impl Default for CpConfig {
    fn default() -> Self {
        Self {
            max_nodes: 100_000,
            complete_greedily: true,
        }
    }
}

impl CpConfig {
    pub fn with_max_nodes(mut self, max_nodes: u64) -> Self {
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_complete_greedily(mut self, enabled: bool) -> Self {
        self.complete_greedily = enabled;
        self
    }
}

/// Constraint-backtracking strategy.
#[derive(Clone)]
pub struct ConstraintStrategy {
    config: CpConfig,
    rules: RuleEngine,
    quality: Arc<dyn QualityModel>,
}

impl Default for ConstraintStrategy {
    fn default() -> Self {
        Self::new(CpConfig::default())
    }
}

impl fmt::Debug for ConstraintStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintStrategy")
            .field("config", &self.config)
            .field("rules", &self.rules)
            .field("quality", &self.quality.name())
            .finish()
    }
}

impl ConstraintStrategy {
    pub fn new(config: CpConfig) -> Self {
        Self {
            config,
            rules: RuleEngine::default(),
            quality: Arc::new(WeightedQuality::default()),
        }
    }

    /// Sets the ordering of the greedy completion pass.
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }

    /// Sets the model candidates are ranked with.
    pub fn with_quality_model(mut self, model: Arc<dyn QualityModel>) -> Self {
        self.quality = model;
        self
    }
}

/// Best completed candidate seen so far.
struct Incumbent<'s, 'i, 'a> {
    strategy: &'s ConstraintStrategy,
    index: &'i EligibilityIndex<'a>,
    budget: &'s SearchBudget,
    order: Vec<usize>,
    best: Option<(Placement, Metrics)>,
    candidates: u64,
}

impl<'s, 'i, 'a> Incumbent<'s, 'i, 'a> {
    fn new(
        strategy: &'s ConstraintStrategy,
        index: &'i EligibilityIndex<'a>,
        budget: &'s SearchBudget,
    ) -> Self {
        Self {
            strategy,
            index,
            budget,
            order: strategy.rules.sort_all(index),
            best: None,
            candidates: 0,
        }
    }

    /// Completes `partial` if enabled and keeps it when it outranks the
    /// incumbent.
    fn offer(&mut self, partial: &Placement) {
        let index = self.index;
        let mut placement = partial.clone();
        if self.strategy.config.complete_greedily && placement.assigned_count() < index.len() {
            let mut busy = placement.busy_index(index);
            fill(index, &self.order, &mut placement, &mut busy, self.budget);
        }

        let snapshot = index.snapshot();
        let schedule = placement.to_schedule(index);
        let conflicts = ConflictDetector::new(snapshot).detect(&schedule);
        let metrics = QualityScorer::new(self.strategy.quality.as_ref())
            .evaluate(snapshot, &schedule, &conflicts);
        self.candidates += 1;

        if self
            .best
            .as_ref()
            .map_or(true, |(_, incumbent)| metrics.outranks(incumbent))
        {
            self.best = Some((placement, metrics));
        }
    }

    fn into_placement(self) -> Placement {
        self.best
            .map(|(placement, _)| placement)
            .unwrap_or_else(|| Placement::empty(self.index.len()))
    }
}

impl SearchStrategy for ConstraintStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Constraint
    }

    fn generate(&self, index: &EligibilityIndex<'_>, budget: &SearchBudget) -> StrategyOutcome {
        let mut incumbent = Incumbent::new(self, index, budget);
        incumbent.offer(&Placement::empty(index.len()));

        let result = search::backtrack(index, self.config.max_nodes, budget, |partial| {
            incumbent.offer(partial)
        });
        debug!(
            nodes = result.nodes,
            backtracks = result.backtracks,
            max_depth = result.max_depth,
            deepest = result.best.assigned_count(),
            candidates = incumbent.candidates,
            termination = ?result.termination,
            "backtracking finished"
        );

        StrategyOutcome {
            placement: incumbent.into_placement(),
            iterations: result.nodes,
            termination: result.termination,
        }
    }
}
