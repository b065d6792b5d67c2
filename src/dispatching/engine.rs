//! Rule engine for multi-criteria requirement ordering.
//!
//! Composes multiple ordering rules with configurable evaluation modes
//! and tie-breaking strategies.

use std::sync::Arc;

use super::{rules, OrderingRule, RuleKind, RuleScore};
use crate::eligibility::EligibilityIndex;

/// How multiple rules are combined.
#[derive(Debug, Clone, Default)]
pub enum EvaluationMode {
    /// Apply rules in sequence; use next rule only on ties.
    #[default]
    Sequential,
    /// Compute weighted sum of all rule scores.
    Weighted,
}

/// How ties are broken after all rules are exhausted.
#[derive(Debug, Clone, Default)]
pub enum TieBreaker {
    /// Keep catalog order (the sort is stable).
    #[default]
    NextRule,
    /// Deterministic by requirement id (lexicographic).
    ById,
}

#[derive(Clone)]
struct WeightedRule {
    rule: Arc<dyn OrderingRule>,
    weight: f64,
}

/// A composable rule engine for requirement ordering.
///
/// # Example
/// ```
/// use u_timetable::dispatching::{rules, RuleEngine};
///
/// let engine = RuleEngine::new()
///     .with_rule(rules::Scarcity)
///     .with_tie_breaker(rules::Enrollment);
/// ```
#[derive(Clone)]
pub struct RuleEngine {
    rules: Vec<WeightedRule>,
    mode: EvaluationMode,
    tie_breaker: TieBreaker,
    epsilon: f64,
}

impl RuleEngine {
    /// Creates an empty rule engine.
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            mode: EvaluationMode::Sequential,
            tie_breaker: TieBreaker::NextRule,
            epsilon: 1e-9,
        }
    }

    /// Most-constrained-first ordering: scarcity, then degree, then id.
    pub fn most_constrained_first() -> Self {
        Self::new()
            .with_rule(rules::Scarcity)
            .with_tie_breaker(rules::Degree)
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Builds a sequential engine from configured rule kinds, ending with an id tie-break.
    pub fn from_kinds(kinds: &[RuleKind]) -> Self {
        kinds
            .iter()
            .fold(Self::new(), |engine, kind| match kind {
                RuleKind::Scarcity => engine.with_rule(rules::Scarcity),
                RuleKind::Degree => engine.with_rule(rules::Degree),
                RuleKind::Enrollment => engine.with_rule(rules::Enrollment),
            })
            .with_final_tie_breaker(TieBreaker::ById)
    }

    /// Adds a primary rule (weight 1.0).
    pub fn with_rule<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 1.0,
        });
        self
    }

    /// Adds a weighted rule.
    pub fn with_weighted_rule<R: OrderingRule + 'static>(mut self, rule: R, weight: f64) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight,
        });
        self
    }

    /// Adds a tie-breaking rule (weight 0.0, used only in Sequential mode).
    pub fn with_tie_breaker<R: OrderingRule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(WeightedRule {
            rule: Arc::new(rule),
            weight: 0.0,
        });
        self
    }

    /// Sets the evaluation mode.
    pub fn with_mode(mut self, mode: EvaluationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the final tie-breaking strategy.
    pub fn with_final_tie_breaker(mut self, tie_breaker: TieBreaker) -> Self {
        self.tie_breaker = tie_breaker;
        self
    }

    /// Orders the given requirements, first-to-place first.
    pub fn sort(&self, requirements: &[usize], index: &EligibilityIndex<'_>) -> Vec<usize> {
        let mut order = requirements.to_vec();
        if order.is_empty() {
            return order;
        }

        match &self.mode {
            EvaluationMode::Sequential => {
                // Score once per requirement; comparisons then stay cheap.
                let scores: Vec<Vec<RuleScore>> = order
                    .iter()
                    .map(|&r| self.rules.iter().map(|wr| wr.rule.evaluate(r, index)).collect())
                    .collect();
                let mut positions: Vec<usize> = (0..order.len()).collect();
                positions.sort_by(|&a, &b| {
                    self.compare_sequential(&scores[a], &scores[b])
                        .then_with(|| self.final_tie(order[a], order[b], index))
                });
                order = positions.into_iter().map(|p| requirements[p]).collect();
            }
            EvaluationMode::Weighted => {
                let mut scored: Vec<(usize, f64)> = order
                    .iter()
                    .map(|&r| (r, self.weighted_score(r, index)))
                    .collect();
                scored.sort_by(|a, b| {
                    a.1.partial_cmp(&b.1)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| self.final_tie(a.0, b.0, index))
                });
                order = scored.into_iter().map(|(r, _)| r).collect();
            }
        }

        order
    }

    /// Orders every requirement of the index.
    pub fn sort_all(&self, index: &EligibilityIndex<'_>) -> Vec<usize> {
        let all: Vec<usize> = (0..index.len()).collect();
        self.sort(&all, index)
    }

    /// Evaluates a single requirement and returns weighted scores from each rule.
    pub fn evaluate(&self, req: usize, index: &EligibilityIndex<'_>) -> Vec<RuleScore> {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(req, index) * wr.weight)
            .collect()
    }

    fn compare_sequential(&self, a: &[RuleScore], b: &[RuleScore]) -> std::cmp::Ordering {
        for (score_a, score_b) in a.iter().zip(b) {
            if (score_a - score_b).abs() > self.epsilon {
                return score_a
                    .partial_cmp(score_b)
                    .unwrap_or(std::cmp::Ordering::Equal);
            }
        }
        std::cmp::Ordering::Equal
    }

    fn final_tie(&self, a: usize, b: usize, index: &EligibilityIndex<'_>) -> std::cmp::Ordering {
        match &self.tie_breaker {
            TieBreaker::NextRule => std::cmp::Ordering::Equal,
            TieBreaker::ById => index.requirement(a).id.cmp(&index.requirement(b).id),
        }
    }

    fn weighted_score(&self, req: usize, index: &EligibilityIndex<'_>) -> f64 {
        self.rules
            .iter()
            .map(|wr| wr.rule.evaluate(req, index) * wr.weight)
            .sum()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::most_constrained_first()
    }
}

impl std::fmt::Debug for RuleEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleEngine")
            .field(
                "rules",
                &self
                    .rules
                    .iter()
                    .map(|r| format!("{}(w={})", r.rule.name(), r.weight))
                    .collect::<Vec<_>>(),
            )
            .field("mode", &self.mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Catalog, CatalogSnapshot};
    use crate::models::{Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot};

    // Z100 has 1 candidate room, A100 and M100 have 2 each.
    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("M100", "CS").with_enrollment(10))
                .with_course(Course::new("A100", "CS").with_enrollment(15))
                .with_course(Course::new("Z100", "CS").with_enrollment(50))
                .with_teacher(Teacher::new("T1", "CS"))
                .with_room(Room::new("R20", 20, RoomType::Theory))
                .with_room(Room::new("R60", 60, RoomType::Theory))
                .with_time_slot(TimeSlot::new(
                    "S1",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                )),
        )
    }

    fn codes(order: &[usize], index: &EligibilityIndex<'_>) -> Vec<String> {
        order
            .iter()
            .map(|&r| index.requirement(r).course_code.clone())
            .collect()
    }

    #[test]
    fn test_scarcity_then_id() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let order = RuleEngine::new()
            .with_rule(rules::Scarcity)
            .with_final_tie_breaker(TieBreaker::ById)
            .sort_all(&index);
        assert_eq!(codes(&order, &index), vec!["Z100", "A100", "M100"]);
    }

    #[test]
    fn test_stable_without_tie_breaker() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let order = RuleEngine::new().with_rule(rules::Scarcity).sort_all(&index);
        assert_eq!(codes(&order, &index), vec!["Z100", "M100", "A100"]);
    }

    #[test]
    fn test_sequential_tie_breaker_rule() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let order = RuleEngine::new()
            .with_rule(rules::Scarcity)
            .with_tie_breaker(rules::Enrollment)
            .sort_all(&index);
        // A100 (15 students) before M100 (10 students)
        assert_eq!(codes(&order, &index), vec!["Z100", "A100", "M100"]);
    }

    #[test]
    fn test_weighted_mode() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let order = RuleEngine::new()
            .with_mode(EvaluationMode::Weighted)
            .with_weighted_rule(rules::Enrollment, 1.0)
            .sort_all(&index);
        assert_eq!(codes(&order, &index), vec!["Z100", "A100", "M100"]);
    }

    #[test]
    fn test_from_kinds() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let order = RuleEngine::from_kinds(&[RuleKind::Enrollment]).sort_all(&index);
        assert_eq!(codes(&order, &index)[0], "Z100");
    }

    #[test]
    fn test_empty_and_evaluate() {
        let snap = snapshot();
        let index = EligibilityIndex::build(&snap);
        let engine = RuleEngine::default();
        assert!(engine.sort(&[], &index).is_empty());
        let scores = engine.evaluate(2, &index);
        assert_eq!(scores.len(), 2);
        assert!((scores[0] - 1.0).abs() < 1e-10);
        assert_eq!(scores[1], 0.0); // tie-breaker weight
    }
}
