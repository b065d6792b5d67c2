//! Engine boundary: request/response contract and result assembly.
//!
//! [`TimetableEngine`] is the one entry point callers need. A
//! generation run is
//!
//! 1. validate the catalog (malformed input is the only error),
//! 2. freeze the filtered [`CatalogSnapshot`],
//! 3. build the [`EligibilityIndex`],
//! 4. run a [`SearchStrategy`] under the request's budget,
//! 5. detect conflicts, score, and assemble a [`GenerateResult`].
//!
//! Low-quality schedules are results, not errors: a run that leaves
//! requirements unscheduled or stops on its budget still reports
//! `success: true`.
//!
//! # Example
//!
//! ```
//! use u_timetable::catalog::Catalog;
//! use u_timetable::engine::{GenerateRequest, TimetableEngine};
//! use u_timetable::models::{Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot};
//!
//! let catalog = Catalog::new()
//!     .with_course(Course::new("CS101", "CS").with_sessions_per_week(1))
//!     .with_teacher(Teacher::new("T1", "CS"))
//!     .with_room(Room::new("R1", 40, RoomType::Theory))
//!     .with_time_slot(TimeSlot::new(
//!         "MON-1",
//!         DayOfWeek::Monday,
//!         TimeOfDay::hm(9, 0),
//!         TimeOfDay::hm(10, 0),
//!     ));
//!
//! let result = TimetableEngine::default()
//!     .generate(GenerateRequest::new(catalog))
//!     .unwrap();
//! assert!(result.success);
//! assert_eq!(result.sessions.len(), 1);
//! ```

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, CatalogFilter, CatalogSnapshot};
use crate::conflict::ConflictDetector;
use crate::cp::{ConstraintStrategy, CpConfig};
use crate::dispatching::{RuleEngine, RuleKind};
use crate::eligibility::EligibilityIndex;
use crate::error::{EngineError, Result};
use crate::ga::{FitnessWeights, GaConfig, GeneticStrategy};
use crate::models::{Assignment, Conflict, DepartmentId, Schedule};
use crate::quality::{Metrics, QualityModel, QualityScorer, QualityWeights, WeightedQuality};
use crate::scheduler::{
    Algorithm, GreedyStrategy, SearchBudget, SearchStrategy, StrategyOutcome, Termination,
};

/// A generation request: strategy, filters, budget, and the catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub algorithm: Algorithm,
    /// Only schedule courses of this semester.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester_filter: Option<i32>,
    /// Only schedule courses of this department.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department_filter: Option<DepartmentId>,
    /// Generation / node cap for genetic and constraint search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    /// Wall-clock limit for the search.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(flatten)]
    pub catalog: Catalog,
}

impl GenerateRequest {
    /// A greedy request over the whole catalog.
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_semester(mut self, semester: i32) -> Self {
        self.semester_filter = Some(semester);
        self
    }

    pub fn with_department(mut self, department: impl AsRef<str>) -> Self {
        self.department_filter = Some(DepartmentId::new(department));
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    fn filter(&self) -> CatalogFilter {
        CatalogFilter {
            semester: self.semester_filter,
            department: self.department_filter.clone(),
        }
    }
}

/// Run metadata attached to a [`GenerateResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub algorithm: Algorithm,
    /// Number of assignments produced.
    pub total_sessions: usize,
    pub generation_time_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semester: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentId>,
    /// Greedy placements, GA generations, or backtracking nodes.
    pub iterations: u64,
    pub termination: Termination,
    /// The run stopped on its iteration cap, deadline, or cancellation.
    pub budget_limited: bool,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub success: bool,
    pub sessions: Vec<Assignment>,
    pub conflicts: Vec<Conflict>,
    pub metrics: Metrics,
    pub metadata: RunMetadata,
}

impl GenerateResult {
    /// The sessions as a [`Schedule`].
    pub fn schedule(&self) -> Schedule {
        Schedule {
            assignments: self.sessions.clone(),
        }
    }
}

/// A request to check a hand-built schedule against a catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateRequest {
    #[serde(default)]
    pub sessions: Vec<Assignment>,
    #[serde(flatten)]
    pub catalog: Catalog,
}

impl ValidateRequest {
    pub fn new(catalog: Catalog, sessions: Vec<Assignment>) -> Self {
        Self { sessions, catalog }
    }

    /// Parses a request from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of a validation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResult {
    pub is_valid: bool,
    pub conflicts: Vec<Conflict>,
    pub total_sessions: usize,
    pub conflict_count: usize,
}

/// Engine configuration.
///
/// Every field has a default, so `{}` is a valid config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Quality score weights.
    pub quality: QualityWeights,
    /// Genetic search parameters.
    pub genetic: GaConfig,
    /// Genetic fitness penalties.
    pub fitness: FitnessWeights,
    /// Backtracking parameters.
    pub constraint: CpConfig,
    /// Requirement ordering rules, applied in sequence (id breaks ties).
    pub ordering: Vec<RuleKind>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            quality: QualityWeights::default(),
            genetic: GaConfig::default(),
            fitness: FitnessWeights::default(),
            constraint: CpConfig::default(),
            ordering: vec![RuleKind::Scarcity, RuleKind::Degree],
        }
    }
}

impl EngineConfig {
    /// Parses a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_quality(mut self, quality: QualityWeights) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_genetic(mut self, genetic: GaConfig) -> Self {
        self.genetic = genetic;
        self
    }

    pub fn with_fitness(mut self, fitness: FitnessWeights) -> Self {
        self.fitness = fitness;
        self
    }

    pub fn with_constraint(mut self, constraint: CpConfig) -> Self {
        self.constraint = constraint;
        self
    }

    pub fn with_ordering(mut self, ordering: Vec<RuleKind>) -> Self {
        self.ordering = ordering;
        self
    }
}

/// University timetable engine.
pub struct TimetableEngine {
    config: EngineConfig,
    quality: Arc<dyn QualityModel>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Default for TimetableEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl std::fmt::Debug for TimetableEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimetableEngine")
            .field("config", &self.config)
            .field("quality", &self.quality.name())
            .finish()
    }
}

impl TimetableEngine {
    /// Creates an engine scoring with [`WeightedQuality`].
    pub fn new(config: EngineConfig) -> Self {
        let quality = Arc::new(WeightedQuality::new(config.quality.clone()));
        Self {
            config,
            quality,
            cancel: None,
        }
    }

    /// Replaces the quality model.
    pub fn with_quality_model(mut self, model: impl QualityModel + 'static) -> Self {
        self.quality = Arc::new(model);
        self
    }

    /// Stops every run once `flag` is set; runs return their best so far.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Generates a timetable with the requested algorithm.
    pub fn generate(&self, request: GenerateRequest) -> Result<GenerateResult> {
        let algorithm = request.algorithm;
        self.generate_ensemble(request, &[algorithm])
    }

    /// Runs several algorithms concurrently over one eligibility index.
    ///
    /// Returns the highest-quality result. Ties go to fewer conflicts,
    /// then to the earlier algorithm in `algorithms`. An empty list runs
    /// the request's own algorithm.
    pub fn generate_ensemble(
        &self,
        request: GenerateRequest,
        algorithms: &[Algorithm],
    ) -> Result<GenerateResult> {
        let started = Instant::now();
        request
            .catalog
            .validate()
            .map_err(EngineError::InvalidCatalog)?;

        let algorithms = if algorithms.is_empty() {
            vec![request.algorithm]
        } else {
            algorithms.to_vec()
        };
        let filter = request.filter();
        let budget = self.budget(&request);
        let snapshot = CatalogSnapshot::load(request.catalog, filter);
        let index = EligibilityIndex::build(&snapshot);

        info!(
            algorithms = ?algorithms,
            courses = snapshot.courses().len(),
            requirements = index.len(),
            teachers = snapshot.teachers().len(),
            rooms = snapshot.rooms().len(),
            slots = snapshot.time_slots().len(),
            "generation started"
        );
        for req in index.infeasible() {
            warn!(
                requirement = %index.requirement(req).id,
                "no eligible teacher, room, and slot"
            );
        }

        let mut results: Vec<GenerateResult> = algorithms
            .par_iter()
            .map(|&algorithm| {
                let strategy = self.strategy(algorithm);
                let budget = match algorithm {
                    Algorithm::Greedy => budget.without_iteration_cap(),
                    _ => budget.clone(),
                };
                let outcome = strategy.generate(&index, &budget);
                self.assemble(&index, algorithm, outcome, started)
            })
            .collect();

        let mut winner = 0;
        for i in 1..results.len() {
            if results[i].metrics.outranks(&results[winner].metrics) {
                winner = i;
            }
        }
        let best = results.swap_remove(winner);

        info!(
            algorithm = %best.metadata.algorithm,
            scheduled = best.metrics.scheduled_sessions,
            total = best.metrics.total_sessions,
            conflicts = best.metrics.total_conflicts,
            score = best.metrics.quality_score,
            elapsed_ms = best.metadata.generation_time_ms,
            "generation finished"
        );
        Ok(best)
    }

    /// Checks a hand-built schedule against the catalog.
    ///
    /// Reports teacher/room double-booking, capacity, availability, and
    /// workload conflicts. Requirements without a session are not
    /// reported: a partial schedule is not invalid by itself.
    pub fn validate(&self, request: ValidateRequest) -> Result<ValidateResult> {
        request
            .catalog
            .validate()
            .map_err(EngineError::InvalidCatalog)?;
        let snapshot = CatalogSnapshot::unfiltered(request.catalog);

        for session in &request.sessions {
            check_reference(session, "course", &session.course_code, |id| {
                snapshot.course_index(id)
            })?;
            check_reference(session, "teacher", &session.teacher_id, |id| {
                snapshot.teacher_index(id)
            })?;
            check_reference(session, "room", &session.room_id, |id| snapshot.room_index(id))?;
        }

        let schedule = Schedule {
            assignments: request.sessions,
        };
        let conflicts = ConflictDetector::new(&snapshot).detect_assignments(&schedule);
        debug!(
            sessions = schedule.assignment_count(),
            conflicts = conflicts.len(),
            "schedule validated"
        );
        Ok(ValidateResult {
            is_valid: conflicts.is_empty(),
            total_sessions: schedule.assignment_count(),
            conflict_count: conflicts.len(),
            conflicts,
        })
    }

    fn budget(&self, request: &GenerateRequest) -> SearchBudget {
        let mut budget = SearchBudget::unlimited();
        if let Some(max) = request.max_iterations {
            budget = budget.with_max_iterations(max);
        }
        if let Some(ms) = request.timeout_ms {
            budget = budget.with_timeout(Duration::from_millis(ms));
        }
        if let Some(flag) = &self.cancel {
            budget = budget.with_cancel_flag(Arc::clone(flag));
        }
        budget
    }

    fn strategy(&self, algorithm: Algorithm) -> Box<dyn SearchStrategy> {
        let rules = RuleEngine::from_kinds(&self.config.ordering);
        match algorithm {
            Algorithm::Greedy => Box::new(GreedyStrategy::new().with_rules(rules)),
            Algorithm::Genetic => Box::new(
                GeneticStrategy::new(self.config.genetic.clone())
                    .with_weights(self.config.fitness.clone())
                    .with_rules(rules),
            ),
            Algorithm::Constraint => Box::new(
                ConstraintStrategy::new(self.config.constraint.clone())
                    .with_rules(rules)
                    .with_quality_model(Arc::clone(&self.quality)),
            ),
        }
    }

    fn assemble(
        &self,
        index: &EligibilityIndex<'_>,
        algorithm: Algorithm,
        outcome: StrategyOutcome,
        started: Instant,
    ) -> GenerateResult {
        let snapshot = index.snapshot();
        let schedule = outcome.placement.to_schedule(index);
        let conflicts = ConflictDetector::new(snapshot).detect(&schedule);
        let metrics =
            QualityScorer::new(self.quality.as_ref()).evaluate(snapshot, &schedule, &conflicts);

        let budget_limited = outcome.termination.is_budget_limited();
        if budget_limited {
            warn!(
                %algorithm,
                termination = ?outcome.termination,
                iterations = outcome.iterations,
                "search stopped on its budget, returning best so far"
            );
        }

        let filter = snapshot.filter();
        GenerateResult {
            success: true,
            metadata: RunMetadata {
                algorithm,
                total_sessions: schedule.assignment_count(),
                generation_time_ms: u64::try_from(started.elapsed().as_millis())
                    .unwrap_or(u64::MAX),
                semester: filter.semester,
                department: filter.department.clone(),
                iterations: outcome.iterations,
                termination: outcome.termination,
                budget_limited,
            },
            sessions: schedule.assignments,
            conflicts,
            metrics,
        }
    }
}

fn check_reference(
    session: &Assignment,
    entity: &'static str,
    id: &str,
    lookup: impl Fn(&str) -> Option<usize>,
) -> Result<()> {
    match lookup(id) {
        Some(_) => Ok(()),
        None => Err(EngineError::UnknownReference {
            session: session.session_requirement.clone(),
            entity,
            id: id.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ConflictKind, Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot,
    };

    fn slot(id: &str, day: DayOfWeek, h: u32) -> TimeSlot {
        TimeSlot::new(id, day, TimeOfDay::hm(h, 0), TimeOfDay::hm(h + 1, 0))
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with_course(
                Course::new("CS101", "CS")
                    .with_semester(1)
                    .with_sessions_per_week(2)
                    .with_enrollment(30),
            )
            .with_course(Course::new("MA201", "MATH").with_semester(3))
            .with_teacher(Teacher::new("T1", "CS"))
            .with_teacher(Teacher::new("T2", "MATH"))
            .with_room(Room::new("R1", 40, RoomType::Theory))
            .with_room(Room::new("R2", 60, RoomType::Theory))
            .with_time_slot(slot("MON-9", DayOfWeek::Monday, 9))
            .with_time_slot(slot("WED-9", DayOfWeek::Wednesday, 9))
    }

    #[test]
    fn test_generate_greedy() {
        let result = TimetableEngine::default()
            .generate(GenerateRequest::new(catalog()))
            .unwrap();
        assert!(result.success);
        assert_eq!(result.sessions.len(), 3);
        assert!(result.conflicts.is_empty());
        assert_eq!(result.metrics.scheduling_rate, 1.0);
        assert_eq!(result.metadata.algorithm, Algorithm::Greedy);
        assert_eq!(result.metadata.total_sessions, 3);
        assert!(!result.metadata.budget_limited);
    }

    #[test]
    fn test_generate_with_filters() {
        let request = GenerateRequest::new(catalog()).with_semester(1);
        let result = TimetableEngine::default().generate(request).unwrap();
        assert_eq!(result.metrics.total_sessions, 2);
        assert!(result.sessions.iter().all(|s| s.course_code == "CS101"));
        assert_eq!(result.metadata.semester, Some(1));

        let request = GenerateRequest::new(catalog()).with_department("math");
        let result = TimetableEngine::default().generate(request).unwrap();
        assert_eq!(result.metrics.total_sessions, 1);
        assert_eq!(result.metadata.department, Some(DepartmentId::new("MATH")));
    }

    #[test]
    fn test_invalid_catalog_rejected() {
        let bad = catalog().with_room(Room::new("R1", 0, RoomType::Theory));
        let err = TimetableEngine::default()
            .generate(GenerateRequest::new(bad))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidCatalog(_)));
        assert_eq!(err.validation_errors().len(), 2);
    }

    #[test]
    fn test_iteration_budget_flags_metadata() {
        let request = GenerateRequest::new(catalog())
            .with_algorithm(Algorithm::Genetic)
            .with_max_iterations(1);
        let result = TimetableEngine::default().generate(request).unwrap();
        assert_eq!(result.metadata.iterations, 1);
        assert!(result.metadata.budget_limited);
        assert_eq!(result.metadata.termination, Termination::IterationLimit);
        assert!(result.success);
    }

    #[test]
    fn test_greedy_ignores_iteration_cap() {
        let request = GenerateRequest::new(catalog()).with_max_iterations(1);
        let result = TimetableEngine::default().generate(request).unwrap();
        assert_eq!(result.sessions.len(), 3);
        assert!(!result.metadata.budget_limited);
    }

    #[test]
    fn test_cancelled_run_still_succeeds() {
        let flag = Arc::new(AtomicBool::new(true));
        let engine = TimetableEngine::default().with_cancel_flag(flag);
        for algorithm in [Algorithm::Greedy, Algorithm::Constraint] {
            let request = GenerateRequest::new(catalog()).with_algorithm(algorithm);
            let result = engine.generate(request).unwrap();
            assert!(result.success);
            assert!(result.sessions.is_empty(), "{algorithm}");
            assert_eq!(result.metadata.termination, Termination::Cancelled);
            assert_eq!(result.metadata.iterations, 0);
            assert_eq!(result.metrics.scheduling_rate, 0.0);
        }
    }

    #[test]
    fn test_ensemble_picks_best() {
        let result = TimetableEngine::default()
            .generate_ensemble(GenerateRequest::new(catalog()), &Algorithm::ALL)
            .unwrap();
        assert_eq!(result.metrics.scheduling_rate, 1.0);
        // All three tie on a full, clean schedule: the first listed wins
        assert_eq!(result.metadata.algorithm, Algorithm::Greedy);
    }

    #[test]
    fn test_validate_reports_double_booking() {
        let engine = TimetableEngine::default();
        let generated = engine.generate(GenerateRequest::new(catalog())).unwrap();
        let mut sessions = generated.sessions.clone();
        let clash = Assignment {
            session_requirement: "MA201#1".into(),
            course_code: "MA201".into(),
            teacher_id: "T2".into(),
            room_id: sessions[0].room_id.clone(),
            day_of_week: sessions[0].day_of_week,
            time_slot_id: sessions[0].time_slot_id.clone(),
            start_time: sessions[0].start_time,
            end_time: sessions[0].end_time,
        };
        sessions.retain(|s| s.session_requirement != "MA201#1");
        sessions.push(clash);

        let result = engine
            .validate(ValidateRequest::new(catalog(), sessions))
            .unwrap();
        assert!(!result.is_valid);
        assert_eq!(result.total_sessions, 3);
        assert_eq!(result.conflict_count, 1);
        assert_eq!(result.conflicts[0].kind, ConflictKind::RoomConflict);
    }

    #[test]
    fn test_validate_unknown_teacher() {
        let engine = TimetableEngine::default();
        let mut sessions = engine
            .generate(GenerateRequest::new(catalog()))
            .unwrap()
            .sessions;
        sessions[0].teacher_id = "ghost".into();
        let err = engine
            .validate(ValidateRequest::new(catalog(), sessions))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::UnknownReference { entity: "teacher", .. }
        ));
    }

    #[test]
    fn test_request_json_contract() {
        let json = r#"{
            "algorithm": "constraint",
            "semesterFilter": 1,
            "departmentFilter": {"code": "cs"},
            "maxIterations": 500,
            "courses": [{"code": "CS101", "department": "CS", "semester": 1}],
            "teachers": [{"id": "T1", "department": "CS"}],
            "rooms": [{"id": "R1", "capacity": 40, "type": "theory"}],
            "timeSlots": [{"id": "S1", "dayOfWeek": "monday", "startTime": "09:00", "endTime": "10:00"}]
        }"#;
        let request = GenerateRequest::from_json(json).unwrap();
        assert_eq!(request.algorithm, Algorithm::Constraint);
        assert_eq!(request.department_filter, Some(DepartmentId::new("CS")));
        assert_eq!(request.catalog.courses.len(), 1);

        let result = TimetableEngine::default().generate(request).unwrap();
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["metadata"]["algorithm"], "constraint");
        assert_eq!(value["metadata"]["semester"], 1);
        assert_eq!(value["metrics"]["schedulingRate"], 1.0);
        assert!(value["sessions"][0]["sessionRequirement"].is_string());
        assert_eq!(value["sessions"][0]["startTime"], "09:00");
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config.ordering, vec![RuleKind::Scarcity, RuleKind::Degree]);
        assert_eq!(config.genetic.population_size, 50);
        assert_eq!(config.constraint.max_nodes, 100_000);

        let config =
            EngineConfig::from_json(r#"{"genetic": {"seed": 7}, "ordering": ["enrollment"]}"#)
                .unwrap();
        assert_eq!(config.genetic.seed, 7);
        assert_eq!(config.genetic.max_generations, 200);
        assert_eq!(config.ordering, vec![RuleKind::Enrollment]);
    }
}
