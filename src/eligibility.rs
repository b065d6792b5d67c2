//! Eligibility index.
//!
//! Precomputes, for every session requirement, the (teacher, room,
//! time slot) triples that satisfy the static rules, ignoring other
//! assignments:
//!
//! - **Teacher**: qualified for the course and available for the whole slot.
//! - **Room**: matching type, capacity ≥ expected enrollment, and no
//!   conflicting department restriction.
//! - **Slot**: active, on a day the course's department operates, and
//!   at least one session long.
//!
//! Sessions of the same course share one candidate list. Lists are built
//! in parallel (read-only catalog, no shared mutation) and ordered
//! slot-major, then teacher, then rooms by ascending capacity (best fit
//! first), so every consumer sees the same deterministic order.

use std::collections::BTreeSet;

use rayon::prelude::*;
use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::models::{Assignment, Course, SessionRequirement};

/// A feasible (teacher, room, slot) triple, as snapshot indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Candidate {
    pub teacher: usize,
    pub room: usize,
    pub slot: usize,
}

/// Eligibility of one session requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility<'a> {
    /// At least one candidate triple exists.
    Feasible(&'a [Candidate]),
    /// No triple satisfies the static rules.
    Infeasible,
}

/// Per-requirement candidate sets plus the lookups strategies share.
#[derive(Debug)]
pub struct EligibilityIndex<'a> {
    snapshot: &'a CatalogSnapshot,
    /// Candidate list per course (indexed like `snapshot.courses()`).
    per_course: Vec<Vec<Candidate>>,
    /// `slot_overlap[a][b]`: slots a and b overlap in time.
    slot_overlap: Vec<Vec<bool>>,
    /// Requirements whose candidates share a teacher or room with this one.
    neighbors: Vec<Vec<usize>>,
}

impl<'a> EligibilityIndex<'a> {
    /// Builds the index for a snapshot.
    pub fn build(snapshot: &'a CatalogSnapshot) -> Self {
        let per_course: Vec<Vec<Candidate>> = snapshot
            .courses()
            .par_iter()
            .map(|course| course_candidates(snapshot, course))
            .collect();

        let slots = snapshot.time_slots();
        let slot_overlap = slots
            .iter()
            .map(|a| slots.iter().map(|b| a.window().overlaps(&b.window())).collect())
            .collect();

        let neighbors = build_neighbors(snapshot, &per_course);

        let index = Self {
            snapshot,
            per_course,
            slot_overlap,
            neighbors,
        };
        debug!(
            requirements = index.len(),
            infeasible = index.infeasible().len(),
            "eligibility index built"
        );
        index
    }

    /// The snapshot this index was built from.
    #[inline]
    pub fn snapshot(&self) -> &'a CatalogSnapshot {
        self.snapshot
    }

    /// Number of session requirements.
    #[inline]
    pub fn len(&self) -> usize {
        self.snapshot.requirements().len()
    }

    /// Whether there is nothing to schedule.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Session requirement at `req`.
    #[inline]
    pub fn requirement(&self, req: usize) -> &'a SessionRequirement {
        &self.snapshot.requirements()[req]
    }

    /// Candidate triples for a requirement.
    #[inline]
    pub fn candidates(&self, req: usize) -> &[Candidate] {
        &self.per_course[self.requirement(req).course_index]
    }

    /// Eligibility status for a requirement.
    pub fn eligibility(&self, req: usize) -> Eligibility<'_> {
        let candidates = self.candidates(req);
        if candidates.is_empty() {
            Eligibility::Infeasible
        } else {
            Eligibility::Feasible(candidates)
        }
    }

    /// Scarcity: size of the candidate set.
    #[inline]
    pub fn scarcity(&self, req: usize) -> usize {
        self.candidates(req).len()
    }

    /// Requirements with no candidate at all.
    pub fn infeasible(&self) -> Vec<usize> {
        (0..self.len())
            .filter(|&r| self.candidates(r).is_empty())
            .collect()
    }

    /// Requirements that share a teacher or room with `req`.
    #[inline]
    pub fn neighbors(&self, req: usize) -> &[usize] {
        &self.neighbors[req]
    }

    /// Static degree: number of neighboring requirements.
    #[inline]
    pub fn degree(&self, req: usize) -> usize {
        self.neighbors[req].len()
    }

    /// Whether two slots overlap in time.
    #[inline]
    pub fn slots_overlap(&self, a: usize, b: usize) -> bool {
        self.slot_overlap[a][b]
    }

    /// Whether two placements would double-book a teacher or room.
    #[inline]
    pub fn clashes(&self, a: Candidate, b: Candidate) -> bool {
        (a.teacher == b.teacher || a.room == b.room) && self.slot_overlap[a.slot][b.slot]
    }

    /// Slot length in minutes.
    #[inline]
    pub fn slot_minutes(&self, slot: usize) -> u32 {
        self.snapshot.time_slots()[slot].duration_minutes()
    }

    /// Materializes an assignment for `req` placed on `candidate`.
    pub fn assignment(&self, req: usize, candidate: Candidate) -> Assignment {
        let requirement = self.requirement(req);
        let slot = &self.snapshot.time_slots()[candidate.slot];
        Assignment {
            session_requirement: requirement.id.clone(),
            course_code: requirement.course_code.clone(),
            teacher_id: self.snapshot.teachers()[candidate.teacher].id.clone(),
            room_id: self.snapshot.rooms()[candidate.room].id.clone(),
            day_of_week: slot.day_of_week,
            time_slot_id: slot.id.clone(),
            start_time: slot.start_time,
            end_time: slot.end_time,
        }
    }
}

fn course_candidates(snapshot: &CatalogSnapshot, course: &Course) -> Vec<Candidate> {
    let slots: Vec<usize> = snapshot
        .time_slots()
        .iter()
        .enumerate()
        .filter(|(_, s)| {
            s.is_active
                && s.duration_minutes() >= course.session_length()
                && snapshot.department_operates(&course.department, s.day_of_week)
        })
        .map(|(i, _)| i)
        .collect();

    let teachers: Vec<usize> = snapshot
        .teachers()
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_qualified_for(course))
        .map(|(i, _)| i)
        .collect();

    let room_type = course.room_type();
    let mut rooms: Vec<usize> = snapshot
        .rooms()
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            r.room_type == room_type
                && r.capacity >= course.expected_enrollment
                && r.admits_department(&course.department)
        })
        .map(|(i, _)| i)
        .collect();
    rooms.sort_by_key(|&r| (snapshot.rooms()[r].capacity, r));

    let mut candidates = Vec::new();
    for &slot in &slots {
        let window = snapshot.time_slots()[slot].window();
        for &teacher in &teachers {
            if !snapshot.teachers()[teacher].is_available(&window) {
                continue;
            }
            for &room in &rooms {
                candidates.push(Candidate {
                    teacher,
                    room,
                    slot,
                });
            }
        }
    }
    candidates
}

fn build_neighbors(snapshot: &CatalogSnapshot, per_course: &[Vec<Candidate>]) -> Vec<Vec<usize>> {
    let requirements = snapshot.requirements();
    let mut by_teacher: Vec<Vec<usize>> = vec![Vec::new(); snapshot.teachers().len()];
    let mut by_room: Vec<Vec<usize>> = vec![Vec::new(); snapshot.rooms().len()];

    // Resource usage is per course; fan out to requirements afterwards.
    let mut course_teachers: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); per_course.len()];
    let mut course_rooms: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); per_course.len()];
    for (c, candidates) in per_course.iter().enumerate() {
        for cand in candidates {
            course_teachers[c].insert(cand.teacher);
            course_rooms[c].insert(cand.room);
        }
    }
    for (r, req) in requirements.iter().enumerate() {
        for &t in &course_teachers[req.course_index] {
            by_teacher[t].push(r);
        }
        for &room in &course_rooms[req.course_index] {
            by_room[room].push(r);
        }
    }

    requirements
        .par_iter()
        .enumerate()
        .map(|(r, req)| {
            let mut set = BTreeSet::new();
            for &t in &course_teachers[req.course_index] {
                set.extend(by_teacher[t].iter().copied());
            }
            for &room in &course_rooms[req.course_index] {
                set.extend(by_room[room].iter().copied());
            }
            set.remove(&r);
            set.into_iter().collect()
        })
        .collect()
}
