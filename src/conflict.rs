//! Conflict detection.
//!
//! The authoritative check of a (possibly partial) schedule against the
//! catalog. Strategies use incremental shortcuts while searching; the
//! detector re-checks everything once at the end.
//!
//! # Checks
//!
//! Run in this order; one assignment may appear in several entries.
//!
//! 1. `teacher_conflict`: two assignments share a teacher and overlap.
//! 2. `room_conflict`: two assignments share a room and overlap.
//! 3. `capacity_conflict`: room capacity below expected enrollment.
//! 4. `availability_conflict`: session outside the teacher's availability.
//! 5. `workload_violation`: a teacher's weekly hours outside [min, max].
//!    Idle teachers count when they are qualified for a course of the
//!    snapshot; their entry names no sessions.
//! 6. `unscheduled`: a session requirement without an assignment.
//!
//! Overlap is half-open: `[s1, e1)` and `[s2, e2)` on the same day
//! overlap iff `s1 < e2 && s2 < e1`. Every overlapping pair yields its
//! own entry naming both requirements.
//!
//! The detector is pure: the same schedule always yields the same list.

use std::collections::BTreeMap;

use crate::catalog::CatalogSnapshot;
use crate::models::{Assignment, Conflict, ConflictKind, Schedule};

/// Checks schedules against one catalog snapshot.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector<'a> {
    snapshot: &'a CatalogSnapshot,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(snapshot: &'a CatalogSnapshot) -> Self {
        Self { snapshot }
    }

    /// Runs all six checks.
    pub fn detect(&self, schedule: &Schedule) -> Vec<Conflict> {
        let mut conflicts = self.detect_assignments(schedule);
        conflicts.extend(self.unscheduled(schedule));
        conflicts
    }

    /// Runs the assignment-level checks (1–5), skipping `unscheduled`.
    ///
    /// Used to validate hand-edited schedules that need not cover every
    /// requirement.
    pub fn detect_assignments(&self, schedule: &Schedule) -> Vec<Conflict> {
        let assignments = &schedule.assignments;
        let mut conflicts = Vec::new();
        conflicts.extend(double_bookings(
            assignments,
            ConflictKind::TeacherConflict,
            "teacher",
            |a| a.teacher_id.as_str(),
        ));
        conflicts.extend(double_bookings(
            assignments,
            ConflictKind::RoomConflict,
            "room",
            |a| a.room_id.as_str(),
        ));
        conflicts.extend(self.capacity(assignments));
        conflicts.extend(self.availability(assignments));
        conflicts.extend(self.workload(assignments));
        conflicts
    }

    fn capacity(&self, assignments: &[Assignment]) -> Vec<Conflict> {
        let snapshot = self.snapshot;
        assignments
            .iter()
            .filter_map(|a| {
                let course = &snapshot.courses()[snapshot.course_index(&a.course_code)?];
                let room = &snapshot.rooms()[snapshot.room_index(&a.room_id)?];
                (room.capacity < course.expected_enrollment).then(|| {
                    Conflict::new(
                        ConflictKind::CapacityConflict,
                        vec![a.session_requirement.clone()],
                        format!(
                            "room {} holds {} but {} expects {} students",
                            room.id, room.capacity, course.code, course.expected_enrollment
                        ),
                    )
                })
            })
            .collect()
    }

    fn availability(&self, assignments: &[Assignment]) -> Vec<Conflict> {
        let snapshot = self.snapshot;
        assignments
            .iter()
            .filter_map(|a| {
                let teacher = &snapshot.teachers()[snapshot.teacher_index(&a.teacher_id)?];
                let window = a.window();
                (!teacher.is_available(&window)).then(|| {
                    Conflict::new(
                        ConflictKind::AvailabilityConflict,
                        vec![a.session_requirement.clone()],
                        format!("teacher {} is not available {}", teacher.id, window),
                    )
                })
            })
            .collect()
    }

    fn workload(&self, assignments: &[Assignment]) -> Vec<Conflict> {
        let snapshot = self.snapshot;
        let mut taught: Vec<Vec<&Assignment>> = vec![Vec::new(); snapshot.teachers().len()];
        for a in assignments {
            if let Some(t) = snapshot.teacher_index(&a.teacher_id) {
                taught[t].push(a);
            }
        }

        snapshot
            .teachers()
            .iter()
            .zip(taught)
            .enumerate()
            .filter(|(t, (_, taught))| !taught.is_empty() || snapshot.teaches_any_course(*t))
            .filter_map(|(_, (teacher, taught))| {
                let minutes: u32 = taught.iter().map(|a| a.duration_minutes()).sum();
                if minutes >= teacher.min_minutes() && minutes <= teacher.max_minutes() {
                    return None;
                }
                Some(Conflict::new(
                    ConflictKind::WorkloadViolation,
                    taught.iter().map(|a| a.session_requirement.clone()).collect(),
                    format!(
                        "teacher {} assigned {:.1} h/week, outside [{}, {}]",
                        teacher.id,
                        f64::from(minutes) / 60.0,
                        teacher.min_hours_per_week,
                        teacher.max_hours_per_week
                    ),
                ))
            })
            .collect()
    }

    fn unscheduled(&self, schedule: &Schedule) -> Vec<Conflict> {
        let scheduled = schedule.scheduled_requirements();
        self.snapshot
            .requirements()
            .iter()
            .filter(|r| !scheduled.contains(r.id.as_str()))
            .map(|r| {
                Conflict::new(
                    ConflictKind::Unscheduled,
                    vec![r.id.clone()],
                    format!("session {} could not be scheduled", r.id),
                )
            })
            .collect()
    }
}

/// Every overlapping pair of assignments sharing a resource.
///
/// Assignments are grouped by resource and swept in (day, start) order,
/// so each group costs O(k log k + pairs).
fn double_bookings<'s>(
    assignments: &'s [Assignment],
    kind: ConflictKind,
    label: &str,
    resource: impl Fn(&'s Assignment) -> &'s str,
) -> Vec<Conflict> {
    let mut groups: BTreeMap<&str, Vec<&Assignment>> = BTreeMap::new();
    for a in assignments {
        groups.entry(resource(a)).or_default().push(a);
    }

    let mut conflicts = Vec::new();
    for (id, mut group) in groups {
        group.sort_by_key(|a| (a.day_of_week.index(), a.start_time, a.end_time));
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                if b.day_of_week != a.day_of_week || b.start_time >= a.end_time {
                    break;
                }
                conflicts.push(Conflict::new(
                    kind,
                    vec![a.session_requirement.clone(), b.session_requirement.clone()],
                    format!(
                        "{label} {id} double-booked: {} ({}) overlaps {} ({})",
                        a.session_requirement,
                        a.window(),
                        b.session_requirement,
                        b.window()
                    ),
                ));
            }
        }
    }
    conflicts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::models::{
        Course, DayOfWeek, Room, RoomType, Teacher, TimeOfDay, TimeSlot,
    };

    fn snapshot() -> CatalogSnapshot {
        CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("CS101", "CS").with_sessions_per_week(2).with_enrollment(30))
                .with_course(Course::new("CS102", "CS").with_enrollment(50))
                .with_teacher(
                    Teacher::new("T1", "CS")
                        .with_workload(2, 20)
                        .with_availability(DayOfWeek::Monday, TimeOfDay::hm(9, 0), TimeOfDay::hm(12, 0)),
                )
                .with_teacher(Teacher::new("T2", "CS"))
                .with_room(Room::new("R1", 40, RoomType::Theory))
                .with_room(Room::new("R2", 60, RoomType::Theory))
                .with_time_slot(TimeSlot::new(
                    "S1",
                    DayOfWeek::Monday,
                    TimeOfDay::hm(9, 0),
                    TimeOfDay::hm(10, 0),
                )),
        )
    }

    fn assign(req: &str, teacher: &str, room: &str, day: DayOfWeek, start: u32, end: u32) -> Assignment {
        Assignment {
            session_requirement: req.into(),
            course_code: req.split('#').next().unwrap_or(req).into(),
            teacher_id: teacher.into(),
            room_id: room.into(),
            day_of_week: day,
            time_slot_id: format!("{start}"),
            start_time: TimeOfDay::from_minutes(start).unwrap(),
            end_time: TimeOfDay::from_minutes(end).unwrap(),
        }
    }

    fn kinds(conflicts: &[Conflict]) -> Vec<ConflictKind> {
        conflicts.iter().map(|c| c.kind).collect()
    }

    #[test]
    fn test_clean_schedule() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600),
                assign("CS101#2", "T1", "R1", DayOfWeek::Monday, 600, 660),
                assign("CS102#1", "T2", "R2", DayOfWeek::Monday, 540, 600),
            ],
        };
        assert!(ConflictDetector::new(&snap).detect(&schedule).is_empty());
    }

    #[test]
    fn test_teacher_double_booking_names_both() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600),
                assign("CS101#2", "T1", "R2", DayOfWeek::Monday, 570, 630),
            ],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        let teacher: Vec<_> = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::TeacherConflict)
            .collect();
        assert_eq!(teacher.len(), 1);
        assert!(teacher[0].involves("CS101#1"));
        assert!(teacher[0].involves("CS101#2"));
    }

    #[test]
    fn test_adjoining_sessions_do_not_conflict() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600),
                assign("CS101#2", "T1", "R1", DayOfWeek::Monday, 600, 660),
            ],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        assert!(conflicts.is_empty());
    }

    #[test]
    fn test_same_time_other_day() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assign("CS102#1", "T2", "R2", DayOfWeek::Monday, 540, 600),
                assign("CS101#1", "T2", "R2", DayOfWeek::Tuesday, 540, 600),
            ],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        // Only T1, idle below its 2 h floor
        assert_eq!(kinds(&conflicts), vec![ConflictKind::WorkloadViolation]);
    }

    #[test]
    fn test_idle_teacher_below_floor() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![assign("CS102#1", "T2", "R2", DayOfWeek::Monday, 540, 600)],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::WorkloadViolation);
        assert!(conflicts[0].involved_assignments.is_empty());
        assert!(conflicts[0].message.contains("teacher T1 assigned 0.0 h/week"));
    }

    #[test]
    fn test_idle_teacher_outside_snapshot_ignored() {
        let snap = CatalogSnapshot::unfiltered(
            Catalog::new()
                .with_course(Course::new("CS101", "CS"))
                .with_teacher(Teacher::new("T1", "CS"))
                .with_teacher(Teacher::new("M1", "MATH").with_workload(4, 10))
                .with_room(Room::new("R1", 40, RoomType::Theory)),
        );
        let schedule = Schedule {
            assignments: vec![assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600)],
        };
        assert!(ConflictDetector::new(&snap).detect(&schedule).is_empty());
    }

    #[test]
    fn test_all_pairs_reported() {
        let snap = snapshot();
        // Three mutually overlapping sessions in one room: three pairs
        let schedule = Schedule {
            assignments: vec![
                assign("CS101#1", "T1", "R2", DayOfWeek::Monday, 540, 600),
                assign("CS101#2", "T2", "R2", DayOfWeek::Monday, 550, 610),
                assign("CS102#1", "X", "R2", DayOfWeek::Monday, 560, 620),
            ],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        let rooms = conflicts
            .iter()
            .filter(|c| c.kind == ConflictKind::RoomConflict)
            .count();
        assert_eq!(rooms, 3);
    }

    #[test]
    fn test_capacity_availability_and_order() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                // R1 is too small for CS102 and T1 is not available on Tuesday
                assign("CS102#1", "T1", "R1", DayOfWeek::Tuesday, 540, 600),
                assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600),
            ],
        };
        let conflicts = ConflictDetector::new(&snap).detect(&schedule);
        assert_eq!(
            kinds(&conflicts),
            vec![
                ConflictKind::CapacityConflict,
                ConflictKind::AvailabilityConflict,
                ConflictKind::Unscheduled,
            ]
        );
        assert!(conflicts[2].involves("CS101#2"));
    }

    #[test]
    fn test_workload_band() {
        let snap = snapshot();
        // T1 needs at least 2 hours
        let schedule = Schedule {
            assignments: vec![assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600)],
        };
        let conflicts = ConflictDetector::new(&snap).detect_assignments(&schedule);
        assert_eq!(kinds(&conflicts), vec![ConflictKind::WorkloadViolation]);
        assert!(conflicts[0].message.contains("1.0 h/week"));
    }

    #[test]
    fn test_idempotent() {
        let snap = snapshot();
        let schedule = Schedule {
            assignments: vec![
                assign("CS101#1", "T1", "R1", DayOfWeek::Monday, 540, 600),
                assign("CS101#2", "T1", "R1", DayOfWeek::Monday, 540, 600),
            ],
        };
        let detector = ConflictDetector::new(&snap);
        assert_eq!(detector.detect(&schedule), detector.detect(&schedule));
    }
}
