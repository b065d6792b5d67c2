//! Course model.
//!
//! A course is the catalog unit that needs weekly teaching sessions.
//! Each course expands into `sessions_per_week` session requirements
//! before scheduling.

use serde::{Deserialize, Serialize};

use super::{DepartmentId, RoomType};

/// Converts weekly hours to minutes. Negative hours count as zero and
/// the product saturates.
pub fn hours_to_minutes(hours: i32) -> u32 {
    u32::try_from(hours).unwrap_or(0).saturating_mul(60)
}

/// Default length of one teaching session (minutes).
pub const DEFAULT_SESSION_MINUTES: i32 = 60;

/// Kind of teaching delivered in a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    /// Lecture-style session.
    #[default]
    Theory,
    /// Lab or hands-on session.
    Practical,
}

/// A course to be timetabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique course code (e.g., "CS101").
    pub code: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Owning department.
    pub department: DepartmentId,
    /// Subject area used for qualification matching.
    #[serde(default)]
    pub subject: Option<String>,
    /// Semester number.
    #[serde(default)]
    pub semester: i32,
    /// Credit value.
    #[serde(default)]
    pub credits: i32,
    /// Contact hours per week.
    #[serde(default)]
    pub hours_per_week: i32,
    /// Length of one session (minutes).
    #[serde(default = "default_session_minutes")]
    pub session_minutes: i32,
    /// Explicit session count (overrides the derived value).
    #[serde(default)]
    pub sessions_per_week: Option<i32>,
    /// Theory or practical.
    #[serde(default)]
    pub session_type: SessionType,
    /// Room type required (defaults from `session_type`).
    #[serde(default)]
    pub required_room_type: Option<RoomType>,
    /// Expected number of enrolled students.
    #[serde(default)]
    pub expected_enrollment: i32,
}

fn default_session_minutes() -> i32 {
    DEFAULT_SESSION_MINUTES
}

impl Course {
    /// Creates a course with one weekly contact hour.
    pub fn new(code: impl Into<String>, department: impl AsRef<str>) -> Self {
        Self {
            code: code.into(),
            name: String::new(),
            department: DepartmentId::new(department),
            subject: None,
            semester: 1,
            credits: 0,
            hours_per_week: 1,
            session_minutes: DEFAULT_SESSION_MINUTES,
            sessions_per_week: None,
            session_type: SessionType::Theory,
            required_room_type: None,
            expected_enrollment: 0,
        }
    }

    /// Sets the course name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the subject area.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the semester.
    pub fn with_semester(mut self, semester: i32) -> Self {
        self.semester = semester;
        self
    }

    /// Sets the credit value.
    pub fn with_credits(mut self, credits: i32) -> Self {
        self.credits = credits;
        self
    }

    /// Sets weekly contact hours.
    pub fn with_hours_per_week(mut self, hours: i32) -> Self {
        self.hours_per_week = hours;
        self
    }

    /// Sets the session length (minutes).
    pub fn with_session_minutes(mut self, minutes: i32) -> Self {
        self.session_minutes = minutes;
        self
    }

    /// Sets an explicit weekly session count.
    pub fn with_sessions_per_week(mut self, sessions: i32) -> Self {
        self.sessions_per_week = Some(sessions);
        self
    }

    /// Sets the session type.
    pub fn with_session_type(mut self, session_type: SessionType) -> Self {
        self.session_type = session_type;
        self
    }

    /// Sets the required room type.
    pub fn with_room_type(mut self, room_type: RoomType) -> Self {
        self.required_room_type = Some(room_type);
        self
    }

    /// Sets expected enrollment.
    pub fn with_enrollment(mut self, students: i32) -> Self {
        self.expected_enrollment = students;
        self
    }

    /// Weekly session count.
    ///
    /// Explicit `sessions_per_week` wins; otherwise
    /// `ceil(hours_per_week * 60 / session_minutes)`, at least 1.
    /// Negative counts (rejected by validation) yield zero sessions.
    pub fn sessions_per_week(&self) -> u32 {
        if let Some(n) = self.sessions_per_week {
            return u32::try_from(n).unwrap_or(0);
        }
        let minutes = hours_to_minutes(self.hours_per_week);
        minutes.div_ceil(self.session_length().max(1)).max(1)
    }

    /// Session length in minutes, zero when negative.
    pub fn session_length(&self) -> u32 {
        u32::try_from(self.session_minutes).unwrap_or(0)
    }

    /// Room type this course must be placed in.
    pub fn room_type(&self) -> RoomType {
        self.required_room_type
            .clone()
            .unwrap_or_else(|| RoomType::for_session(self.session_type))
    }
}
