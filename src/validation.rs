//! Input validation for timetable catalogs.
//!
//! Checks structural integrity of courses, teachers, rooms, and time
//! slots before any search begins. Every offending record is reported;
//! the engine does not attempt partial recovery from malformed data.
//!
//! Detects:
//! - Duplicate IDs and department codes
//! - Malformed time ranges (`start >= end`)
//! - Overlapping availability windows for one teacher on one day
//! - Overlapping active time slots on one day
//! - Non-positive room capacity
//! - Negative counts and hours
//! - Weekly hours beyond the length of a week
//! - Inverted workload bands (`min > max`)
//! - Zero-length sessions
//! - Departments without a code or name

use std::collections::HashSet;

use thiserror::Error;

use crate::models::{Course, Department, Room, Teacher, TimeSlot, TimeWindow};

/// Upper bound for any weekly hour figure.
pub const MAX_WEEKLY_HOURS: i32 = 168;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A time range has `start >= end`.
    InvalidTimeRange,
    /// A teacher's availability windows overlap on one day.
    OverlappingAvailability,
    /// Two active time slots overlap on one day.
    OverlappingTimeSlots,
    /// A room has no seats.
    InvalidCapacity,
    /// A count or hour field is negative.
    NegativeValue,
    /// Weekly hours exceed [`MAX_WEEKLY_HOURS`].
    InvalidHours,
    /// A teacher's minimum hours exceed the maximum.
    InvalidWorkload,
    /// A course session is empty or longer than a day.
    InvalidSessionLength,
    /// A department record lacks a code or a name.
    InvalidDepartment,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the catalog handed to a generation run.
///
/// Checks:
/// 1. No duplicate course codes, teacher, room, time slot IDs or department codes
/// 2. All courses have a session length within one day, non-negative counts,
///    and at most [`MAX_WEEKLY_HOURS`] of teaching per week
/// 3. All teachers have `0 <= min <= max <= MAX_WEEKLY_HOURS` and well-formed,
///    non-overlapping availability
/// 4. All rooms have capacity >= 1
/// 5. All time slots have `start < end`, and active slots on one day never overlap
/// 6. All departments have a code and a name
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_catalog(
    courses: &[Course],
    teachers: &[Teacher],
    rooms: &[Room],
    time_slots: &[TimeSlot],
    departments: &[Department],
) -> ValidationResult {
    let mut errors = Vec::new();

    check_duplicates(&mut errors, "course", courses.iter().map(|c| c.code.as_str()));
    check_duplicates(&mut errors, "teacher", teachers.iter().map(|t| t.id.as_str()));
    check_duplicates(&mut errors, "room", rooms.iter().map(|r| r.id.as_str()));
    check_duplicates(&mut errors, "time slot", time_slots.iter().map(|s| s.id.as_str()));
    check_duplicates(
        &mut errors,
        "department",
        departments.iter().map(|d| d.code.as_str()),
    );

    for course in courses {
        let record = format!("Course '{}'", course.code);
        check_non_negative(&mut errors, &record, "semester", course.semester);
        check_non_negative(&mut errors, &record, "credits", course.credits);
        check_non_negative(&mut errors, &record, "expectedEnrollment", course.expected_enrollment);
        if let Some(sessions) = course.sessions_per_week {
            check_non_negative(&mut errors, &record, "sessionsPerWeek", sessions);
        }
        if check_non_negative(&mut errors, &record, "hoursPerWeek", course.hours_per_week) {
            check_weekly_hours(&mut errors, &record, "hoursPerWeek", course.hours_per_week);
        }

        if course.session_minutes <= 0 || course.session_minutes > MINUTES_PER_DAY {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSessionLength,
                format!(
                    "{record} has sessionMinutes {}, outside 1..={MINUTES_PER_DAY}",
                    course.session_minutes
                ),
            ));
        } else if let Some(sessions) = course.sessions_per_week.filter(|&n| n > 0) {
            let minutes = i64::from(sessions) * i64::from(course.session_minutes);
            if minutes > i64::from(MAX_WEEKLY_HOURS) * 60 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidHours,
                    format!(
                        "{record} asks for {sessions} sessions of {} min, more than a week",
                        course.session_minutes
                    ),
                ));
            }
        }
    }

    for teacher in teachers {
        let record = format!("Teacher '{}'", teacher.id);
        let min_ok =
            check_non_negative(&mut errors, &record, "minHoursPerWeek", teacher.min_hours_per_week)
                && check_weekly_hours(&mut errors, &record, "minHoursPerWeek", teacher.min_hours_per_week);
        let max_ok =
            check_non_negative(&mut errors, &record, "maxHoursPerWeek", teacher.max_hours_per_week)
                && check_weekly_hours(&mut errors, &record, "maxHoursPerWeek", teacher.max_hours_per_week);
        if min_ok && max_ok && teacher.min_hours_per_week > teacher.max_hours_per_week {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidWorkload,
                format!(
                    "{record} has minHoursPerWeek {} above maxHoursPerWeek {}",
                    teacher.min_hours_per_week, teacher.max_hours_per_week
                ),
            ));
        }
        for window in &teacher.availability {
            if !window.is_well_formed() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidTimeRange,
                    format!("{record} availability {window} is empty or inverted"),
                ));
            }
        }
        for (a, b) in overlapping_pairs(&teacher.availability) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OverlappingAvailability,
                format!("{record} availability {a} overlaps {b}"),
            ));
        }
    }

    for room in rooms {
        if room.capacity <= 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidCapacity,
                format!("Room '{}' has capacity {}, need at least 1", room.id, room.capacity),
            ));
        }
    }

    for department in departments {
        if department.code.as_str().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDepartment,
                format!("Department '{}' has an empty code", department.name),
            ));
        }
        if department.name.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidDepartment,
                format!("Department '{}' has an empty name", department.code),
            ));
        }
    }

    for slot in time_slots {
        if !slot.window().is_well_formed() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidTimeRange,
                format!("Time slot '{}' ({}) is empty or inverted", slot.id, slot.window()),
            ));
        }
    }
    let active: Vec<&TimeSlot> = time_slots
        .iter()
        .filter(|s| s.is_active && s.window().is_well_formed())
        .collect();
    for i in 0..active.len() {
        for j in (i + 1)..active.len() {
            if active[i].window().overlaps(&active[j].window()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OverlappingTimeSlots,
                    format!(
                        "Active time slots '{}' and '{}' overlap",
                        active[i].id, active[j].id
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

const MINUTES_PER_DAY: i32 = 24 * 60;

/// Pushes a `NegativeValue` error for `value < 0`. Returns whether it passed.
fn check_non_negative(
    errors: &mut Vec<ValidationError>,
    record: &str,
    field: &str,
    value: i32,
) -> bool {
    if value < 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NegativeValue,
            format!("{record} has negative {field} {value}"),
        ));
        return false;
    }
    true
}

fn check_weekly_hours(
    errors: &mut Vec<ValidationError>,
    record: &str,
    field: &str,
    hours: i32,
) -> bool {
    if hours > MAX_WEEKLY_HOURS {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidHours,
            format!("{record} has {field} {hours}, above {MAX_WEEKLY_HOURS}"),
        ));
        return false;
    }
    true
}

fn check_duplicates<'a>(
    errors: &mut Vec<ValidationError>,
    entity: &str,
    ids: impl Iterator<Item = &'a str>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {entity} ID: {id}"),
            ));
        }
    }
}

fn overlapping_pairs(windows: &[TimeWindow]) -> Vec<(TimeWindow, TimeWindow)> {
    let mut pairs = Vec::new();
    for i in 0..windows.len() {
        for j in (i + 1)..windows.len() {
            if windows[i].is_well_formed()
                && windows[j].is_well_formed()
                && windows[i].overlaps(&windows[j])
            {
                pairs.push((windows[i], windows[j]));
            }
        }
    }
    pairs
}
