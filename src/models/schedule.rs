//! Schedule (solution) model.
//!
//! A schedule is a set of assignments, one per placed session
//! requirement. It may be partial: requirements without an assignment
//! surface as `unscheduled` conflicts.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use super::{DayOfWeek, TimeOfDay, TimeWindow};

/// A complete or partial weekly schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    /// Committed session assignments.
    pub assignments: Vec<Assignment>,
}

/// A committed (teacher, room, day, time slot) binding for one session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Session requirement id (`"<course>#<ordinal>"`).
    pub session_requirement: String,
    /// Course code (denormalized for query convenience).
    pub course_code: String,
    /// Assigned teacher.
    pub teacher_id: String,
    /// Assigned room.
    pub room_id: String,
    /// Day of the week.
    pub day_of_week: DayOfWeek,
    /// Assigned time slot.
    pub time_slot_id: String,
    /// Session start (denormalized from the slot).
    pub start_time: TimeOfDay,
    /// Session end (denormalized from the slot).
    pub end_time: TimeOfDay,
}

/// A reported constraint violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conflict {
    /// Kind of violation.
    pub kind: ConflictKind,
    /// Session requirement ids involved.
    pub involved_assignments: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

/// Classification of conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// One teacher in two overlapping sessions.
    TeacherConflict,
    /// One room hosting two overlapping sessions.
    RoomConflict,
    /// Room smaller than the expected enrollment.
    CapacityConflict,
    /// Session outside the teacher's availability.
    AvailabilityConflict,
    /// Teacher's weekly hours outside the [min, max] band.
    WorkloadViolation,
    /// Session requirement left without an assignment.
    Unscheduled,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConflictKind::TeacherConflict => "teacher_conflict",
            ConflictKind::RoomConflict => "room_conflict",
            ConflictKind::CapacityConflict => "capacity_conflict",
            ConflictKind::AvailabilityConflict => "availability_conflict",
            ConflictKind::WorkloadViolation => "workload_violation",
            ConflictKind::Unscheduled => "unscheduled",
        };
        f.write_str(name)
    }
}

impl Assignment {
    /// Time window occupied by this session.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.day_of_week, self.start_time, self.end_time)
    }

    /// Session length in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.window().duration_minutes()
    }

    /// Whether two sessions overlap in time.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.window().overlaps(&other.window())
    }
}

impl Conflict {
    /// Creates a conflict.
    pub fn new(kind: ConflictKind, involved: Vec<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            involved_assignments: involved,
            message: message.into(),
        }
    }

    /// Whether this conflict references the given requirement.
    pub fn involves(&self, requirement_id: &str) -> bool {
        self.involved_assignments.iter().any(|r| r == requirement_id)
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an assignment.
    pub fn add_assignment(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    /// Number of assignments.
    pub fn assignment_count(&self) -> usize {
        self.assignments.len()
    }

    /// Finds the assignment for a session requirement.
    pub fn assignment_for(&self, requirement_id: &str) -> Option<&Assignment> {
        self.assignments
            .iter()
            .find(|a| a.session_requirement == requirement_id)
    }

    /// Returns all assignments taught by a teacher.
    pub fn assignments_for_teacher(&self, teacher_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.teacher_id == teacher_id)
            .collect()
    }

    /// Returns all assignments held in a room.
    pub fn assignments_for_room(&self, room_id: &str) -> Vec<&Assignment> {
        self.assignments
            .iter()
            .filter(|a| a.room_id == room_id)
            .collect()
    }

    /// Set of scheduled requirement ids.
    pub fn scheduled_requirements(&self) -> HashSet<&str> {
        self.assignments
            .iter()
            .map(|a| a.session_requirement.as_str())
            .collect()
    }

    /// Weekly minutes assigned to a teacher.
    pub fn teacher_minutes(&self, teacher_id: &str) -> u32 {
        self.assignments_for_teacher(teacher_id)
            .iter()
            .map(|a| a.duration_minutes())
            .sum()
    }
}
