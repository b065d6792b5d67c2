//! Schedule quality scoring.
//!
//! # Formula
//!
//! ```text
//! qualityScore = 100 · (w_rate · schedulingRate
//!                     + w_density · (1 − conflictDensity)
//!                     + w_balance · workloadBalance) / (w_rate + w_density + w_balance)
//! ```
//!
//! with default weights 0.5 / 0.3 / 0.2 (which sum to one).
//!
//! - `schedulingRate`: scheduled requirements / total requirements
//!   (1.0 when there is nothing to schedule).
//! - `conflictDensity`: conflict entries, capped at the requirement
//!   count, divided by the requirement count (0.0 when there is nothing
//!   to schedule).
//! - `workloadBalance`: for each teacher with at least one session,
//!   `d = (hours − mid) / half_width` where `mid` and `half_width` are
//!   the centre and half-width of the teacher's [min, max] band
//!   (`max(mid, 1)` when the band is a single point). Balance is
//!   `1 − mean(d²)`, clamped to [0, 1]; 1.0 when no teacher teaches.
//!
//! The formula is a default, not a law: plug a different
//! [`QualityModel`] into the engine to change it.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSnapshot;
use crate::models::{Conflict, ConflictKind, Schedule};

/// Weights of the composite quality score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QualityWeights {
    pub scheduling_rate: f64,
    pub conflict_density: f64,
    pub workload_balance: f64,
}

impl Default for QualityWeights {
    fn default() -> Self {
        Self {
            scheduling_rate: 0.5,
            conflict_density: 0.3,
            workload_balance: 0.2,
        }
    }
}

impl QualityWeights {
    pub fn new(scheduling_rate: f64, conflict_density: f64, workload_balance: f64) -> Self {
        Self {
            scheduling_rate,
            conflict_density,
            workload_balance,
        }
    }
}

/// Component ratios the score is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityInputs {
    pub scheduling_rate: f64,
    pub conflict_density: f64,
    pub workload_balance: f64,
}

/// A pluggable 0–100 quality score.
pub trait QualityModel: Send + Sync {
    /// Model name (for logging).
    fn name(&self) -> &'static str;

    /// Scores the inputs on a 0–100 scale.
    fn score(&self, inputs: &QualityInputs) -> f64;
}

/// Weighted-sum quality model.
#[derive(Debug, Clone, Default)]
pub struct WeightedQuality {
    weights: QualityWeights,
}

impl WeightedQuality {
    pub fn new(weights: QualityWeights) -> Self {
        Self { weights }
    }
}

impl QualityModel for WeightedQuality {
    fn name(&self) -> &'static str {
        "weighted"
    }

    fn score(&self, inputs: &QualityInputs) -> f64 {
        let w = &self.weights;
        let total = w.scheduling_rate + w.conflict_density + w.workload_balance;
        if total <= 0.0 {
            return 0.0;
        }
        let raw = w.scheduling_rate * inputs.scheduling_rate
            + w.conflict_density * (1.0 - inputs.conflict_density)
            + w.workload_balance * inputs.workload_balance;
        (100.0 * raw / total).clamp(0.0, 100.0)
    }
}

/// Metrics reported for a generated schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Composite score, 0–100.
    pub quality_score: f64,
    /// Scheduled / total session requirements.
    pub scheduling_rate: f64,
    /// Total session requirements.
    pub total_sessions: usize,
    /// Requirements with an assignment.
    pub scheduled_sessions: usize,
    /// Conflict entries reported.
    pub total_conflicts: usize,
    /// Capped conflicts / total sessions.
    pub conflict_density: f64,
    /// Workload balance, 0–1.
    pub workload_balance: f64,
    /// Conflict count per kind.
    pub conflicts_by_kind: BTreeMap<ConflictKind, usize>,
}

impl Metrics {
    /// Whether these metrics beat `other`: higher score, then fewer
    /// conflicts.
    pub fn outranks(&self, other: &Metrics) -> bool {
        let (a, b) = (self.quality_score, other.quality_score);
        if (a - b).abs() > 1e-9 {
            return a > b;
        }
        self.total_conflicts < other.total_conflicts
    }
}

/// Scheduled / total, 1.0 when `total` is zero.
pub fn scheduling_rate(scheduled: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        scheduled as f64 / total as f64
    }
}

/// Conflicts (capped at `total`) / total, 0.0 when `total` is zero.
pub fn conflict_density(conflicts: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        conflicts.min(total) as f64 / total as f64
    }
}

/// Workload balance of a schedule (see module docs).
pub fn workload_balance(snapshot: &CatalogSnapshot, schedule: &Schedule) -> f64 {
    let mut minutes: HashMap<&str, u32> = HashMap::new();
    for a in &schedule.assignments {
        *minutes.entry(a.teacher_id.as_str()).or_insert(0) += a.duration_minutes();
    }

    let deviations: Vec<f64> = snapshot
        .teachers()
        .iter()
        .filter_map(|t| {
            let hours = f64::from(*minutes.get(t.id.as_str())?) / 60.0;
            let min = f64::from(t.min_hours_per_week);
            let max = f64::from(t.max_hours_per_week);
            let mid = (min + max) / 2.0;
            let half = (max - min) / 2.0;
            let scale = if half > 0.0 { half } else { mid.max(1.0) };
            Some((hours - mid) / scale)
        })
        .collect();

    if deviations.is_empty() {
        return 1.0;
    }
    let variance = deviations.iter().map(|d| d * d).sum::<f64>() / deviations.len() as f64;
    (1.0 - variance).clamp(0.0, 1.0)
}

/// Computes [`Metrics`] with a quality model.
pub struct QualityScorer<'m> {
    model: &'m dyn QualityModel,
}

impl<'m> QualityScorer<'m> {
    pub fn new(model: &'m dyn QualityModel) -> Self {
        Self { model }
    }

    /// Scores a schedule and its detected conflicts.
    pub fn evaluate(
        &self,
        snapshot: &CatalogSnapshot,
        schedule: &Schedule,
        conflicts: &[Conflict],
    ) -> Metrics {
        let total = snapshot.requirements().len();
        let assigned = schedule.scheduled_requirements();
        let scheduled = snapshot
            .requirements()
            .iter()
            .filter(|r| assigned.contains(r.id.as_str()))
            .count();

        let inputs = QualityInputs {
            scheduling_rate: scheduling_rate(scheduled, total),
            conflict_density: conflict_density(conflicts.len(), total),
            workload_balance: workload_balance(snapshot, schedule),
        };

        let mut conflicts_by_kind = BTreeMap::new();
        for c in conflicts {
            *conflicts_by_kind.entry(c.kind).or_insert(0) += 1;
        }

        Metrics {
            quality_score: self.model.score(&inputs),
            scheduling_rate: inputs.scheduling_rate,
            total_sessions: total,
            scheduled_sessions: scheduled,
            total_conflicts: conflicts.len(),
            conflict_density: inputs.conflict_density,
            workload_balance: inputs.workload_balance,
            conflicts_by_kind,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::{
        Assignment, Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot,
    };

    fn assignment(req: &str, teacher: &str, day: DayOfWeek) -> Assignment {
        Assignment {
            session_requirement: req.into(),
            course_code: req.split('#').next().unwrap_or(req).into(),
            teacher_id: teacher.into(),
            room_id: "R1".into(),
            day_of_week: day,
            time_slot_id: "S".into(),
            start_time: TimeOfDay::hm(9, 0),
            end_time: TimeOfDay::hm(10, 0),
        }
    }

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("CS101", "CS").with_sessions_per_week(2))
                .with_teacher(Teacher::new("T1", "CS"))
                .with_teacher(Teacher::new("T2", "CS").with_workload(2, 4))
                .with_room(Room::new("R1", 40, RoomType::Theory))
                .with_time_slot(TimeSlot::new(
                    "S",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                )),
        )
    }

    #[test]
    fn test_ratios() {
        assert_eq!(scheduling_rate(1, 2), 0.5);
        assert_eq!(scheduling_rate(0, 0), 1.0);
        assert_eq!(conflict_density(1, 4), 0.25);
        assert_eq!(conflict_density(9, 4), 1.0);
        assert_eq!(conflict_density(0, 0), 0.0);
    }

    #[test]
    fn test_balance_pinned() {
        let snap = snapshot();
        // T1: 2h in [0, 20] -> d = (2 - 10) / 10 = -0.8 -> balance 0.36
        let schedule = Schedule {
            assignments: vec![
                assignment("CS101#1", "T1", DayOfWeek::Monday),
                assignment("CS101#2", "T1", DayOfWeek::Tuesday),
            ],
        };
        assert!((workload_balance(&snap, &schedule) - 0.36).abs() < 1e-12);

        // T2: 3h in [2, 4] -> d = 0 -> balance 1.0
        let schedule = Schedule {
            assignments: vec![
                assignment("CS101#1", "T2", DayOfWeek::Monday),
                assignment("CS101#2", "T2", DayOfWeek::Tuesday),
                assignment("CS101#3", "T2", DayOfWeek::Wednesday),
            ],
        };
        assert!((workload_balance(&snap, &schedule) - 1.0).abs() < 1e-12);

        assert_eq!(workload_balance(&snap, &Schedule::new()), 1.0);
    }

    #[test]
    fn test_score_pinned() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assignment("CS101#1", "T1", DayOfWeek::Monday),
                assignment("CS101#2", "T1", DayOfWeek::Wednesday),
            ],
        };
        let model = WeightedQuality::default();
        let metrics = QualityScorer::new(&model).evaluate(&snap, &schedule, &[]);
        // 100 * (0.5 * 1.0 + 0.3 * 1.0 + 0.2 * 0.36)
        assert!((metrics.quality_score - 87.2).abs() < 1e-9);
        assert_eq!(metrics.scheduling_rate, 1.0);
        assert_eq!(metrics.total_sessions, 2);
        assert_eq!(metrics.scheduled_sessions, 2);
        assert_eq!(metrics.total_conflicts, 0);
    }

    #[test]
    fn test_score_with_unscheduled() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![assignment("CS101#1", "T1", DayOfWeek::Monday)],
        };
        let conflicts = vec![Conflict::new(
            ConflictKind::Unscheduled,
            vec!["CS101#2".into()],
            "session CS101#2 could not be scheduled",
        )];
        let model = WeightedQuality::default();
        let metrics = QualityScorer::new(&model).evaluate(&snap, &schedule, &conflicts);
        // T1: 1h -> d = -0.9 -> balance 0.19
        // 100 * (0.5 * 0.5 + 0.3 * 0.5 + 0.2 * 0.19) = 43.8
        assert!((metrics.quality_score - 43.8).abs() < 1e-9);
        assert_eq!(metrics.conflicts_by_kind[&ConflictKind::Unscheduled], 1);
    }

    #[test]
    fn test_custom_weights_normalized() {
        let inputs = QualityInputs {
            scheduling_rate: 1.0,
            conflict_density: 0.0,
            workload_balance: 0.0,
        };
        let model = WeightedQuality::new(QualityWeights::new(1.0, 0.0, 1.0));
        assert!((model.score(&inputs) - 50.0).abs() < 1e-9);
        let zero = WeightedQuality::new(QualityWeights::new(0.0, 0.0, 0.0));
        assert_eq!(zero.score(&inputs), 0.0);
    }

    #[test]
    fn test_scheduled_counts_each_requirement_once() {
        let snap = snapshot();
        // A repeated requirement and one the snapshot does not know
        let schedule = Schedule {
            assignments: vec![
                assignment("CS101#1", "T1", DayOfWeek::Monday),
                assignment("CS101#1", "T1", DayOfWeek::Tuesday),
                assignment("CS999#1", "T1", DayOfWeek::Wednesday),
            ],
        };
        let model = WeightedQuality::default();
        let metrics = QualityScorer::new(&model).evaluate(&snap, &schedule, &[]);
        assert_eq!(metrics.scheduled_sessions, 1);
        assert_eq!(metrics.scheduling_rate, 0.5);
    }

    #[test]
    fn test_outranks() {
        let snap = snapshot();
        let model = WeightedQuality::default();
        let scorer = QualityScorer::new(&model);
        let full = Schedule {
            assignments: vec![
                assignment("CS101#1", "T1", DayOfWeek::Monday),
                assignment("CS101#2", "T1", DayOfWeek::Wednesday),
            ],
        };
        let a = scorer.evaluate(&snap, &full, &[]);
        let b = scorer.evaluate(&snap, &Schedule::new(), &[]);
        assert!(a.outranks(&b));
        assert!(!b.outranks(&a));
        assert!(!a.outranks(&a.clone()));

        let mut fewer = a.clone();
        fewer.total_conflicts = 0;
        let mut more = a;
        more.total_conflicts = 1;
        assert!(fewer.outranks(&more));
    }
}
