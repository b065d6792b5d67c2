//! Catalog snapshot.
//!
//! An immutable, per-run view of the catalog. The engine never reads a
//! global store: callers hand in a [`Catalog`], it is validated once,
//! filtered, and frozen into a [`CatalogSnapshot`] that every later
//! stage borrows read-only.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    Course, DayOfWeek, Department, DepartmentId, Room, SessionRequirement, Teacher, TimeSlot,
};
use crate::validation::{validate_catalog, ValidationResult};

/// Raw catalog data as supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Courses to timetable.
    #[serde(default)]
    pub courses: Vec<Course>,
    /// Teaching staff.
    #[serde(default)]
    pub teachers: Vec<Teacher>,
    /// Rooms.
    #[serde(default)]
    pub rooms: Vec<Room>,
    /// Weekly slot grid.
    #[serde(default)]
    pub time_slots: Vec<TimeSlot>,
    /// Department operating calendars (optional).
    #[serde(default)]
    pub departments: Vec<Department>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a time slot.
    pub fn with_time_slot(mut self, slot: TimeSlot) -> Self {
        self.time_slots.push(slot);
        self
    }

    /// Adds a department.
    pub fn with_department(mut self, department: Department) -> Self {
        self.departments.push(department);
        self
    }

    /// Validates structural integrity. See [`validate_catalog`].
    pub fn validate(&self) -> ValidationResult {
        validate_catalog(
            &self.courses,
            &self.teachers,
            &self.rooms,
            &self.time_slots,
            &self.departments,
        )
    }
}

/// Restricts which courses a run schedules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Only courses of this semester.
    pub semester: Option<i32>,
    /// Only courses of this department.
    pub department: Option<DepartmentId>,
}

impl CatalogFilter {
    /// Whether a course passes the filter.
    pub fn admits(&self, course: &Course) -> bool {
        self.semester.map_or(true, |s| course.semester == s)
            && self
                .department
                .as_ref()
                .map_or(true, |d| &course.department == d)
    }
}

/// Immutable catalog view for one generation run.
///
/// Teachers, rooms, and slots are kept whole (a teacher from another
/// department may still be qualified by course code); only courses are
/// filtered. Entities are addressed by their index in these vectors.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    courses: Vec<Course>,
    teachers: Vec<Teacher>,
    rooms: Vec<Room>,
    time_slots: Vec<TimeSlot>,
    departments: HashMap<DepartmentId, Department>,
    requirements: Vec<SessionRequirement>,
    course_lookup: HashMap<String, usize>,
    teacher_lookup: HashMap<String, usize>,
    room_lookup: HashMap<String, usize>,
    slot_lookup: HashMap<String, usize>,
    filter: CatalogFilter,
}

impl CatalogSnapshot {
    /// Freezes a catalog, keeping only courses admitted by `filter`.
    ///
    /// The catalog is assumed valid; run [`Catalog::validate`] first.
    pub fn load(catalog: Catalog, filter: CatalogFilter) -> Self {
        let Catalog {
            courses,
            teachers,
            rooms,
            time_slots,
            departments,
        } = catalog;

        let courses: Vec<Course> = courses.into_iter().filter(|c| filter.admits(c)).collect();
        let requirements = SessionRequirement::expand(&courses);

        Self {
            course_lookup: index_by(&courses, |c| c.code.as_str()),
            teacher_lookup: index_by(&teachers, |t| t.id.as_str()),
            room_lookup: index_by(&rooms, |r| r.id.as_str()),
            slot_lookup: index_by(&time_slots, |s| s.id.as_str()),
            departments: departments
                .into_iter()
                .map(|d| (d.code.clone(), d))
                .collect(),
            courses,
            teachers,
            rooms,
            time_slots,
            requirements,
            filter,
        }
    }

    /// Freezes a catalog without filtering.
    pub fn unfiltered(catalog: Catalog) -> Self {
        Self::load(catalog, CatalogFilter::default())
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn teachers(&self) -> &[Teacher] {
        &self.teachers
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn time_slots(&self) -> &[TimeSlot] {
        &self.time_slots
    }

    /// Session requirements, in catalog order.
    pub fn requirements(&self) -> &[SessionRequirement] {
        &self.requirements
    }

    /// The filter this snapshot was loaded with.
    pub fn filter(&self) -> &CatalogFilter {
        &self.filter
    }

    /// Course of a requirement.
    #[inline]
    pub fn course_of(&self, requirement: &SessionRequirement) -> &Course {
        &self.courses[requirement.course_index]
    }

    /// Whether the teacher at `teacher` is qualified for any course of
    /// this snapshot.
    pub fn teaches_any_course(&self, teacher: usize) -> bool {
        self.teachers
            .get(teacher)
            .is_some_and(|t| self.courses.iter().any(|c| t.is_qualified_for(c)))
    }

    pub fn course_index(&self, code: &str) -> Option<usize> {
        self.course_lookup.get(code).copied()
    }

    pub fn teacher_index(&self, id: &str) -> Option<usize> {
        self.teacher_lookup.get(id).copied()
    }

    pub fn room_index(&self, id: &str) -> Option<usize> {
        self.room_lookup.get(id).copied()
    }

    pub fn slot_index(&self, id: &str) -> Option<usize> {
        self.slot_lookup.get(id).copied()
    }

    /// Whether a department teaches on `day`.
    ///
    /// Departments without a declared calendar operate Monday–Friday.
    pub fn department_operates(&self, department: &DepartmentId, day: DayOfWeek) -> bool {
        match self.departments.get(department) {
            Some(d) => d.operates_on(day),
            None => DayOfWeek::WEEKDAYS.contains(&day),
        }
    }
}

fn index_by<T>(items: &[T], key: impl Fn(&T) -> &str) -> HashMap<String, usize> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item).to_string(), i))
        .collect()
}
