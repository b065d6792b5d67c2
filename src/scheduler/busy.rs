//! Incremental busy-interval index.
//!
//! Tracks committed sessions per teacher and per room so constructive
//! strategies can test a candidate in O(log k) without a full conflict
//! pass. Each resource keeps one ordered map per weekday from start to
//! end minute; committed intervals never overlap, so only the
//! predecessor of a query's end needs checking.

use std::collections::BTreeMap;

use crate::eligibility::{Candidate, EligibilityIndex};
use crate::models::TimeWindow;

#[derive(Debug, Clone, Default)]
struct WeekCalendar {
    days: [BTreeMap<u32, u32>; 7],
}

impl WeekCalendar {
    fn is_free(&self, window: &TimeWindow) -> bool {
        let (start, end) = (window.start_time.minutes(), window.end_time.minutes());
        self.days[window.day_of_week.index()]
            .range(..end)
            .next_back()
            .map_or(true, |(_, &busy_end)| busy_end <= start)
    }

    fn occupy(&mut self, window: &TimeWindow) {
        self.days[window.day_of_week.index()]
            .insert(window.start_time.minutes(), window.end_time.minutes());
    }

    fn release(&mut self, window: &TimeWindow) {
        self.days[window.day_of_week.index()].remove(&window.start_time.minutes());
    }
}

/// Per-teacher and per-room busy intervals plus teacher load.
#[derive(Debug, Clone)]
pub struct BusyIndex {
    teachers: Vec<WeekCalendar>,
    rooms: Vec<WeekCalendar>,
    teacher_minutes: Vec<u32>,
    teacher_caps: Vec<u32>,
}

impl BusyIndex {
    /// Creates an empty index sized for the snapshot behind `index`.
    pub fn new(index: &EligibilityIndex<'_>) -> Self {
        let snapshot = index.snapshot();
        Self {
            teachers: vec![WeekCalendar::default(); snapshot.teachers().len()],
            rooms: vec![WeekCalendar::default(); snapshot.rooms().len()],
            teacher_minutes: vec![0; snapshot.teachers().len()],
            teacher_caps: snapshot.teachers().iter().map(|t| t.max_minutes()).collect(),
        }
    }

    /// Whether `candidate` is free of double-booking and within the
    /// teacher's weekly ceiling.
    pub fn fits(&self, index: &EligibilityIndex<'_>, candidate: Candidate) -> bool {
        let window = window_of(index, candidate);
        self.teacher_minutes[candidate.teacher] + window.duration_minutes()
            <= self.teacher_caps[candidate.teacher]
            && self.teachers[candidate.teacher].is_free(&window)
            && self.rooms[candidate.room].is_free(&window)
    }

    /// Records `candidate` as committed.
    pub fn commit(&mut self, index: &EligibilityIndex<'_>, candidate: Candidate) {
        let window = window_of(index, candidate);
        self.teachers[candidate.teacher].occupy(&window);
        self.rooms[candidate.room].occupy(&window);
        self.teacher_minutes[candidate.teacher] += window.duration_minutes();
    }

    /// Removes a previously committed `candidate`.
    pub fn release(&mut self, index: &EligibilityIndex<'_>, candidate: Candidate) {
        let window = window_of(index, candidate);
        self.teachers[candidate.teacher].release(&window);
        self.rooms[candidate.room].release(&window);
        self.teacher_minutes[candidate.teacher] =
            self.teacher_minutes[candidate.teacher].saturating_sub(window.duration_minutes());
    }

    /// Minutes committed to a teacher.
    pub fn teacher_minutes(&self, teacher: usize) -> u32 {
        self.teacher_minutes[teacher]
    }
}

fn window_of(index: &EligibilityIndex<'_>, candidate: Candidate) -> TimeWindow {
    index.snapshot().time_slots()[candidate.slot].window()
}
