//! Search strategy contract and the greedy strategy.
//!
//! Every strategy consumes the read-only [`EligibilityIndex`] and a
//! [`SearchBudget`], and produces a [`Placement`]: one gene per session
//! requirement holding an index into that requirement's candidate list,
//! or `None` when the requirement is left unscheduled.
//!
//! Strategies never fail. Running out of budget or candidates degrades
//! the placement; the conflict detector reports what is missing.
//!
//! # Algorithm
//!
//! `GreedyStrategy` orders requirements most-constrained-first and
//! commits, for each, the first candidate free of double-booking,
//! checked incrementally against a [`BusyIndex`].
//!
//! # Reference
//! Burke & Petrovic (2002), "Recent research directions in automated
//! timetabling", EJOR 140(2)

mod budget;
mod busy;
mod greedy;

pub use budget::{SearchBudget, Termination};
pub use busy::BusyIndex;
pub use greedy::GreedyStrategy;

pub(crate) use greedy::fill;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::error;

use crate::eligibility::{Candidate, EligibilityIndex};
use crate::models::Schedule;

/// Search strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Most-constrained-first greedy assignment.
    #[default]
    Greedy,
    /// Genetic search seeded from greedy.
    Genetic,
    /// Backtracking with forward checking.
    Constraint,
}

impl Algorithm {
    /// All strategies, in ensemble order.
    pub const ALL: [Algorithm; 3] = [Algorithm::Greedy, Algorithm::Genetic, Algorithm::Constraint];

    pub fn as_str(self) -> &'static str {
        match self {
            Algorithm::Greedy => "greedy",
            Algorithm::Genetic => "genetic",
            Algorithm::Constraint => "constraint",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "greedy" => Ok(Algorithm::Greedy),
            "genetic" | "ga" => Ok(Algorithm::Genetic),
            "constraint" | "cp" | "backtracking" => Ok(Algorithm::Constraint),
            other => Err(format!("unknown algorithm '{other}'")),
        }
    }
}

/// A (possibly partial) assignment of candidates to requirements.
///
/// Gene `i` belongs to requirement `i`; its value indexes
/// `index.candidates(i)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Placement {
    genes: Vec<Option<usize>>,
}

impl Placement {
    /// A placement with every requirement unscheduled.
    pub fn empty(len: usize) -> Self {
        Self {
            genes: vec![None; len],
        }
    }

    /// Wraps raw genes.
    pub fn from_genes(genes: Vec<Option<usize>>) -> Self {
        Self { genes }
    }

    #[inline]
    pub fn genes(&self) -> &[Option<usize>] {
        &self.genes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.genes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Candidate index chosen for a requirement.
    #[inline]
    pub fn get(&self, req: usize) -> Option<usize> {
        self.genes[req]
    }

    /// Sets (or clears) the candidate for a requirement.
    #[inline]
    pub fn set(&mut self, req: usize, value: Option<usize>) {
        self.genes[req] = value;
    }

    /// Number of scheduled requirements.
    pub fn assigned_count(&self) -> usize {
        self.genes.iter().filter(|g| g.is_some()).count()
    }

    /// Resolved candidate for a requirement, if the gene is set and valid.
    pub fn candidate(&self, index: &EligibilityIndex<'_>, req: usize) -> Option<Candidate> {
        self.genes[req].and_then(|c| index.candidates(req).get(c).copied())
    }

    /// Busy index holding every scheduled candidate.
    pub fn busy_index(&self, index: &EligibilityIndex<'_>) -> BusyIndex {
        let mut busy = BusyIndex::new(index);
        for req in 0..self.len() {
            if let Some(candidate) = self.candidate(index, req) {
                busy.commit(index, candidate);
            }
        }
        busy
    }

    /// Materializes the placement as a schedule, in requirement order.
    ///
    /// A gene pointing outside its candidate list is a strategy bug: it
    /// trips a debug assertion and is otherwise logged and dropped.
    pub fn to_schedule(&self, index: &EligibilityIndex<'_>) -> Schedule {
        debug_assert_eq!(self.genes.len(), index.len(), "placement length mismatch");
        let mut schedule = Schedule::new();
        for (req, gene) in self.genes.iter().enumerate().take(index.len()) {
            let Some(c) = *gene else { continue };
            match index.candidates(req).get(c) {
                Some(&candidate) => schedule.add_assignment(index.assignment(req, candidate)),
                None => {
                    debug_assert!(false, "gene {c} out of range for requirement {req}");
                    error!(
                        requirement = %index.requirement(req).id,
                        gene = c,
                        "invalid candidate index, assignment dropped"
                    );
                }
            }
        }
        schedule
    }
}

/// What a strategy run produced.
#[derive(Debug, Clone)]
pub struct StrategyOutcome {
    /// Best placement found.
    pub placement: Placement,
    /// Iterations consumed (placements, generations, or nodes).
    pub iterations: u64,
    /// Why the run stopped.
    pub termination: Termination,
}

/// A pluggable timetable search strategy.
///
/// Implementations must be deterministic for a fixed configuration and
/// must return their best result when the budget runs out.
pub trait SearchStrategy: Send + Sync {
    /// Which algorithm this is.
    fn algorithm(&self) -> Algorithm;

    /// Searches for a placement.
    fn generate(&self, index: &EligibilityIndex<'_>, budget: &SearchBudget) -> StrategyOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_algorithm_parse_and_display() {
        assert_eq!("greedy".parse::<Algorithm>(), Ok(Algorithm::Greedy));
        assert_eq!("GA".parse::<Algorithm>(), Ok(Algorithm::Genetic));
        assert_eq!(" constraint ".parse::<Algorithm>(), Ok(Algorithm::Constraint));
        assert!("tabu".parse::<Algorithm>().is_err());
        assert_eq!(Algorithm::Genetic.to_string(), "genetic");
    }

    #[test]
    fn test_algorithm_serde() {
        let json = serde_json::to_string(&Algorithm::Constraint).unwrap();
        assert_eq!(json, "\"constraint\"");
        let parsed: Algorithm = serde_json::from_str("\"genetic\"").unwrap();
        assert_eq!(parsed, Algorithm::Genetic);
    }

    #[test]
    fn test_placement_counts() {
        let mut p = Placement::empty(3);
        assert_eq!(p.assigned_count(), 0);
        p.set(1, Some(4));
        assert_eq!(p.get(1), Some(4));
        assert_eq!(p.assigned_count(), 1);
        assert_eq!(p.genes(), &[None, Some(4), None]);
    }
}
