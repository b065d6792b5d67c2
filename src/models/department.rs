//! Department identifiers.
//!
//! Catalog records may reference a department either by a bare code
//! (`"cs"`) or by a reference object (`{"code": "CS", "name": "..."}`).
//! Both forms collapse into a single [`DepartmentId`] at deserialization
//! time, so the engine only ever compares normalized identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::DayOfWeek;

/// Normalized department identifier (trimmed, upper-case).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "DepartmentRef", into = "String")]
pub struct DepartmentId(String);

impl DepartmentId {
    /// Normalizes a raw department code.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_uppercase())
    }

    /// The normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DepartmentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<DepartmentId> for String {
    fn from(value: DepartmentId) -> Self {
        value.0
    }
}

/// Raw department field as it may appear in catalog data.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DepartmentRef {
    /// Plain department code.
    Code(String),
    /// Reference to a department record.
    Record {
        #[serde(alias = "id")]
        code: String,
        #[serde(default)]
        #[allow(dead_code)]
        name: Option<String>,
    },
}

impl From<DepartmentRef> for DepartmentId {
    fn from(value: DepartmentRef) -> Self {
        match value {
            DepartmentRef::Code(code) | DepartmentRef::Record { code, .. } => Self::new(code),
        }
    }
}

/// A department and the days on which it teaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    /// Department identifier.
    #[serde(alias = "id")]
    pub code: DepartmentId,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Days on which the department schedules sessions.
    #[serde(default = "default_operating_days")]
    pub operating_days: Vec<DayOfWeek>,
}

fn default_operating_days() -> Vec<DayOfWeek> {
    DayOfWeek::WEEKDAYS.to_vec()
}

impl Department {
    /// Creates a department named after its code, operating Monday
    /// through Friday.
    pub fn new(code: impl AsRef<str>) -> Self {
        let code = DepartmentId::new(code);
        Self {
            name: code.to_string(),
            code,
            operating_days: default_operating_days(),
        }
    }

    /// Sets the department name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the operating days.
    pub fn with_operating_days(mut self, days: Vec<DayOfWeek>) -> Self {
        self.operating_days = days;
        self
    }

    /// Whether the department teaches on `day`.
    pub fn operates_on(&self, day: DayOfWeek) -> bool {
        self.operating_days.contains(&day)
    }
}
