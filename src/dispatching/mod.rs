//! Requirement ordering rules and rule engine.
//!
//! Decides the order in which a constructive strategy visits session
//! requirements. The classic timetabling heuristic is "most constrained
//! variable first": requirements with the fewest eligible triples are
//! placed before flexible ones so they are not crowded out.
//!
//! # Usage
//!
//! ```
//! use u_timetable::dispatching::{rules, RuleEngine, TieBreaker};
//!
//! let engine = RuleEngine::new()
//!     .with_rule(rules::Scarcity)
//!     .with_tie_breaker(rules::Degree)
//!     .with_final_tie_breaker(TieBreaker::ById);
//! ```
//!
//! # References
//!
//! - Brélaz (1979), "New methods to color the vertices of a graph" (DSatur)
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"

mod engine;
pub mod rules;

pub use engine::{EvaluationMode, RuleEngine, TieBreaker};

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::eligibility::EligibilityIndex;

/// Score returned by an ordering rule.
///
/// Lower scores = visited first.
pub type RuleScore = f64;

/// A rule that scores how urgently a requirement should be placed.
///
/// # Score Convention
/// **Lower score = placed earlier.**
pub trait OrderingRule: Send + Sync + Debug {
    /// Rule name (e.g., "SCARCITY").
    fn name(&self) -> &'static str;

    /// Scores requirement `req` against the eligibility index.
    fn evaluate(&self, req: usize, index: &EligibilityIndex<'_>) -> RuleScore;

    /// Rule description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Serializable rule selector for configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// [`rules::Scarcity`]
    Scarcity,
    /// [`rules::Degree`]
    Degree,
    /// [`rules::Enrollment`]
    Enrollment,
}
