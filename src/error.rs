//! Engine error types.
//!
//! Only malformed input is an error. Infeasible requirements, resource
//! conflicts, and budget exhaustion are reported inside a successful
//! result.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by the timetable engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The catalog failed validation; every offending record is listed.
    #[error("invalid catalog: {}", summarize(.0))]
    InvalidCatalog(Vec<ValidationError>),

    /// A session references an entity missing from the catalog.
    #[error("session '{session}' references unknown {entity} '{id}'")]
    UnknownReference {
        session: String,
        entity: &'static str,
        id: String,
    },

    /// Request or config JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    /// Validation errors, if this is a catalog error.
    pub fn validation_errors(&self) -> &[ValidationError] {
        match self {
            EngineError::InvalidCatalog(errors) => errors,
            _ => &[],
        }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Engine result alias.
pub type Result<T> = std::result::Result<T, EngineError>;
