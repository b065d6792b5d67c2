//! Search budgets and termination.
//!
//! Every strategy is an anytime algorithm: it checks its budget between
//! iterations (greedy placements, GA generations, backtracking nodes)
//! and returns the best result found so far when the budget runs out.
//!
//! A budget combines three independent limits:
//! - an iteration cap,
//! - a wall-clock deadline,
//! - an external cancellation flag shared with the caller.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Why a strategy stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// The search ran to its natural end.
    Completed,
    /// No improvement for the configured number of generations.
    Plateau,
    /// The iteration cap was reached.
    IterationLimit,
    /// The deadline passed.
    TimeLimit,
    /// The caller raised the cancellation flag.
    Cancelled,
}

impl Termination {
    /// Whether the run was cut short by its budget rather than converging.
    pub fn is_budget_limited(self) -> bool {
        matches!(
            self,
            Termination::IterationLimit | Termination::TimeLimit | Termination::Cancelled
        )
    }
}

/// Iteration, time, and cancellation limits for one strategy run.
///
/// Cloning shares the cancellation flag, so concurrent runs of an
/// ensemble can be stopped together.
#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    max_iterations: Option<u64>,
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
}

impl SearchBudget {
    /// A budget with no limits.
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Caps the number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Stops after `timeout` from now.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Stops at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stops once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// The same deadline and cancellation flag, without the iteration cap.
    ///
    /// Used for auxiliary passes (seeding, completion) that do not count
    /// against the main search's iterations.
    pub fn without_iteration_cap(&self) -> Self {
        Self {
            max_iterations: None,
            ..self.clone()
        }
    }

    /// Iteration cap, if any.
    pub fn max_iterations(&self) -> Option<u64> {
        self.max_iterations
    }

    /// Returns the reason to stop after `iterations`, or `None` to continue.
    ///
    /// Cancellation wins over the deadline, which wins over the iteration cap.
    pub fn exhausted(&self, iterations: u64) -> Option<Termination> {
        if let Some(reason) = self.interrupted() {
            return Some(reason);
        }
        if self.max_iterations.is_some_and(|max| iterations >= max) {
            return Some(Termination::IterationLimit);
        }
        None
    }

    /// Cancellation or deadline, ignoring the iteration cap.
    pub fn interrupted(&self) -> Option<Termination> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(Termination::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(Termination::TimeLimit);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_never_exhausted() {
        let budget = SearchBudget::unlimited();
        assert_eq!(budget.exhausted(u64::MAX), None);
    }

    #[test]
    fn test_iteration_limit() {
        let budget = SearchBudget::unlimited().with_max_iterations(10);
        assert_eq!(budget.exhausted(9), None);
        assert_eq!(budget.exhausted(10), Some(Termination::IterationLimit));
    }

    #[test]
    fn test_without_iteration_cap() {
        let budget = SearchBudget::unlimited().with_max_iterations(1);
        let relaxed = budget.without_iteration_cap();
        assert_eq!(relaxed.max_iterations(), None);
        assert_eq!(relaxed.exhausted(100), None);
    }

    #[test]
    fn test_past_deadline() {
        let budget = SearchBudget::unlimited().with_deadline(Instant::now());
        assert_eq!(budget.exhausted(0), Some(Termination::TimeLimit));

        let budget = SearchBudget::unlimited().with_timeout(Duration::from_secs(3600));
        assert_eq!(budget.exhausted(0), None);
    }

    #[test]
    fn test_cancellation_shared_across_clones() {
        let flag = Arc::new(AtomicBool::new(false));
        let budget = SearchBudget::unlimited().with_cancel_flag(flag.clone());
        let copy = budget.clone();
        assert_eq!(copy.exhausted(0), None);

        flag.store(true, Ordering::Relaxed);
        assert_eq!(budget.exhausted(0), Some(Termination::Cancelled));
        assert_eq!(copy.exhausted(0), Some(Termination::Cancelled));
    }

    #[test]
    fn test_budget_limited_classification() {
        assert!(!Termination::Completed.is_budget_limited());
        assert!(!Termination::Plateau.is_budget_limited());
        assert!(Termination::IterationLimit.is_budget_limited());
        assert!(Termination::TimeLimit.is_budget_limited());
        assert!(Termination::Cancelled.is_budget_limited());
    }

    #[test]
    fn test_interrupted_ignores_iteration_cap() {
        let budget = SearchBudget::unlimited().with_max_iterations(0);
        assert_eq!(budget.interrupted(), None);

        let flag = Arc::new(AtomicBool::new(true));
        let budget = budget.with_cancel_flag(flag);
        assert_eq!(budget.interrupted(), Some(Termination::Cancelled));
    }
}
