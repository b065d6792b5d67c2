//! Greedy most-constrained-first strategy.
//!
//! # Algorithm
//!
//! 1. Order requirements with the rule engine (default: scarcity, then
//!    degree, then id).
//! 2. For each requirement, walk its candidates in index order and
//!    commit the first one the busy index accepts.
//! 3. Requirements with no acceptable candidate stay unscheduled.
//!
//! No backtracking. With deterministic ordering and candidate lists the
//! output is identical across runs.
//!
//! # Complexity
//! O(n · c · log k) where n=requirements, c=candidates per requirement,
//! k=sessions per resource per day.

use tracing::debug;

use super::{
    Algorithm, BusyIndex, Placement, SearchBudget, SearchStrategy, StrategyOutcome, Termination,
};
use crate::dispatching::RuleEngine;
use crate::eligibility::EligibilityIndex;

/// Greedy timetable strategy.
#[derive(Debug, Clone, Default)]
pub struct GreedyStrategy {
    rules: RuleEngine,
}

impl GreedyStrategy {
    /// Creates a greedy strategy with most-constrained-first ordering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a custom requirement ordering.
    pub fn with_rules(mut self, rules: RuleEngine) -> Self {
        self.rules = rules;
        self
    }
}

impl SearchStrategy for GreedyStrategy {
    fn algorithm(&self) -> Algorithm {
        Algorithm::Greedy
    }

    fn generate(&self, index: &EligibilityIndex<'_>, budget: &SearchBudget) -> StrategyOutcome {
        let order = self.rules.sort_all(index);
        let mut placement = Placement::empty(index.len());
        let mut busy = BusyIndex::new(index);
        let mut iterations = 0u64;
        let mut termination = Termination::Completed;

        for &req in &order {
            if let Some(reason) = budget.exhausted(iterations) {
                termination = reason;
                break;
            }
            iterations += 1;
            place(index, req, &mut placement, &mut busy);
        }

        debug!(
            placed = placement.assigned_count(),
            total = index.len(),
            ?termination,
            "greedy pass finished"
        );
        StrategyOutcome {
            placement,
            iterations,
            termination,
        }
    }
}

/// Places every still-unscheduled requirement of `order` that fits.
///
/// `busy` must reflect the scheduled genes of `placement`. Stops as soon
/// as the budget is cancelled or past its deadline; the iteration cap
/// does not apply. Returns the number of newly placed requirements.
pub(crate) fn fill(
    index: &EligibilityIndex<'_>,
    order: &[usize],
    placement: &mut Placement,
    busy: &mut BusyIndex,
    budget: &SearchBudget,
) -> usize {
    let mut placed = 0;
    for &req in order {
        if budget.interrupted().is_some() {
            break;
        }
        if placement.get(req).is_none() && place(index, req, placement, busy) {
            placed += 1;
        }
    }
    placed
}

fn place(
    index: &EligibilityIndex<'_>,
    req: usize,
    placement: &mut Placement,
    busy: &mut BusyIndex,
) -> bool {
    let found = index
        .candidates(req)
        .iter()
        .position(|&candidate| busy.fits(index, candidate));
    match found {
        Some(c) => {
            busy.commit(index, index.candidates(req)[c]);
            placement.set(req, Some(c));
            true
        }
        None => false,
    }
}
