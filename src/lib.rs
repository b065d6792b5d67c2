//! University timetable engine.
//!
//! Assigns every weekly teaching session of a set of courses to a
//! (teacher, room, time slot) triple, reports what could not be placed
//! or violates a constraint, and scores the result.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Course`, `Teacher`, `Room`, `TimeSlot`,
//!   `Department`, `SessionRequirement`, `Schedule`, `Assignment`, `Conflict`
//! - **`validation`**: Catalog integrity checks (duplicate ids, time ranges,
//!   capacities, workload bands)
//! - **`catalog`**: The immutable per-run catalog snapshot
//! - **`eligibility`**: Per-requirement candidate triples
//! - **`dispatching`**: Requirement ordering rules
//! - **`scheduler`**: Strategy contract, search budget, greedy strategy
//! - **`ga`**: Genetic strategy
//! - **`cp`**: Constraint-backtracking strategy
//! - **`conflict`**: Conflict detector
//! - **`quality`**: Quality scorer
//! - **`engine`**: Request/response contract and the [`TimetableEngine`]
//!
//! # Architecture
//!
//! ```text
//! Catalog ──validate──▶ CatalogSnapshot ──▶ EligibilityIndex
//!                                               │
//!                      Greedy / Genetic / Constraint (SearchStrategy)
//!                                               │
//!                     Placement ──▶ Schedule ──▶ ConflictDetector ──▶ QualityScorer
//! ```
//!
//! The snapshot and index are read-only and shared; each strategy run
//! owns its working state, so several can run side by side.
//!
//! # References
//!
//! - Burke & Petrovic (2002), "Recent research directions in automated timetabling"
//! - Schaerf (1999), "A survey of automated timetabling"
//! - Haralick & Elliott (1980), "Increasing tree search efficiency for
//!   constraint satisfaction problems"

pub mod catalog;
pub mod conflict;
pub mod cp;
pub mod dispatching;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod ga;
pub mod models;
pub mod quality;
pub mod scheduler;
pub mod validation;

pub use engine::{
    EngineConfig, GenerateRequest, GenerateResult, TimetableEngine, ValidateRequest,
    ValidateResult,
};
pub use error::{EngineError, Result};
pub use scheduler::Algorithm;
