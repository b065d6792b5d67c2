//! Built-in ordering rules.
//!
//! # Score Convention
//! All rules return lower scores for requirements that should be placed first.

use super::{OrderingRule, RuleScore};
use crate::eligibility::EligibilityIndex;

/// Fewest eligible triples first ("most constrained variable").
#[derive(Debug, Clone, Copy)]
pub struct Scarcity;

impl OrderingRule for Scarcity {
    fn name(&self) -> &'static str {
        "SCARCITY"
    }

    fn evaluate(&self, req: usize, index: &EligibilityIndex<'_>) -> RuleScore {
        index.scarcity(req) as f64
    }

    fn description(&self) -> &'static str {
        "Fewest Eligible Triples"
    }
}

/// Most resource overlap with other requirements first.
///
/// A requirement competing for many shared teachers and rooms is
/// harder to place late.
#[derive(Debug, Clone, Copy)]
pub struct Degree;

impl OrderingRule for Degree {
    fn name(&self) -> &'static str {
        "DEGREE"
    }

    fn evaluate(&self, req: usize, index: &EligibilityIndex<'_>) -> RuleScore {
        -(index.degree(req) as f64)
    }

    fn description(&self) -> &'static str {
        "Highest Resource Degree"
    }
}

/// Largest expected enrollment first.
///
/// Big classes fit fewer rooms; placing them early keeps large rooms
/// available for them.
#[derive(Debug, Clone, Copy)]
pub struct Enrollment;

impl OrderingRule for Enrollment {
    fn name(&self) -> &'static str {
        "ENROLLMENT"
    }

    fn evaluate(&self, req: usize, index: &EligibilityIndex<'_>) -> RuleScore {
        let requirement = index.requirement(req);
        -(index.snapshot().course_of(requirement).expected_enrollment as f64)
    }

    fn description(&self) -> &'static str {
        "Largest Enrollment"
    }
}
