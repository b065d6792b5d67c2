//! Teacher model.
//!
//! Teachers are shared human resources with qualifications, a weekly
//! workload band, and an availability calendar.
//!
//! # Availability
//! If no availability windows are declared the teacher is always
//! available. Otherwise a session must lie entirely inside one window.

use serde::{Deserialize, Serialize};

use super::{hours_to_minutes, Course, DayOfWeek, DepartmentId, TimeOfDay, TimeWindow};

/// Default weekly teaching ceiling (hours).
pub const DEFAULT_MAX_HOURS: i32 = 20;

/// A teacher who can deliver sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    /// Unique teacher identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Home department.
    pub department: DepartmentId,
    /// Course codes or subject areas the teacher may teach.
    #[serde(default)]
    pub qualifications: Vec<String>,
    /// Weekly teaching ceiling (hours).
    #[serde(default = "default_max_hours")]
    pub max_hours_per_week: i32,
    /// Weekly teaching floor (hours).
    #[serde(default)]
    pub min_hours_per_week: i32,
    /// Availability windows. Empty = always available.
    #[serde(default)]
    pub availability: Vec<TimeWindow>,
}

fn default_max_hours() -> i32 {
    DEFAULT_MAX_HOURS
}

impl Teacher {
    /// Creates a teacher with no qualifications and default workload band.
    pub fn new(id: impl Into<String>, department: impl AsRef<str>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            department: DepartmentId::new(department),
            qualifications: Vec::new(),
            max_hours_per_week: DEFAULT_MAX_HOURS,
            min_hours_per_week: 0,
            availability: Vec::new(),
        }
    }

    /// Sets the teacher name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a qualification (course code or subject area).
    pub fn with_qualification(mut self, qualification: impl Into<String>) -> Self {
        self.qualifications.push(qualification.into());
        self
    }

    /// Sets the weekly workload band (hours).
    pub fn with_workload(mut self, min_hours: i32, max_hours: i32) -> Self {
        self.min_hours_per_week = min_hours;
        self.max_hours_per_week = max_hours;
        self
    }

    /// Adds an availability window.
    pub fn with_availability(mut self, day: DayOfWeek, start: TimeOfDay, end: TimeOfDay) -> Self {
        self.availability.push(TimeWindow::new(day, start, end));
        self
    }

    /// Whether the teacher may teach `course`.
    ///
    /// Qualified if the qualification set names the course code or its
    /// subject area, or if the set is empty and the teacher belongs to
    /// the course's department.
    pub fn is_qualified_for(&self, course: &Course) -> bool {
        if self.qualifications.is_empty() {
            return self.department == course.department;
        }
        self.qualifications.iter().any(|q| {
            q.eq_ignore_ascii_case(&course.code)
                || course
                    .subject
                    .as_deref()
                    .is_some_and(|s| q.eq_ignore_ascii_case(s))
        })
    }

    /// Whether `window` lies inside the declared availability.
    pub fn is_available(&self, window: &TimeWindow) -> bool {
        self.availability.is_empty() || self.availability.iter().any(|a| a.covers(window))
    }

    /// Weekly ceiling in minutes.
    #[inline]
    pub fn max_minutes(&self) -> u32 {
        hours_to_minutes(self.max_hours_per_week)
    }

    /// Weekly floor in minutes.
    #[inline]
    pub fn min_minutes(&self) -> u32 {
        hours_to_minutes(self.min_hours_per_week)
    }
}
