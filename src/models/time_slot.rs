//! Time slot model.
//!
//! Time slots are the institution's grid of teachable periods.
//! A session occupies exactly one slot.

use serde::{Deserialize, Serialize};

use super::{DayOfWeek, TimeOfDay, TimeWindow};

/// A teachable period in the weekly grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    /// Unique slot identifier.
    pub id: String,
    /// Day of the week.
    pub day_of_week: DayOfWeek,
    /// Start (inclusive).
    pub start_time: TimeOfDay,
    /// End (exclusive).
    pub end_time: TimeOfDay,
    /// Inactive slots are never scheduled.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl TimeSlot {
    /// Creates an active slot.
    pub fn new(
        id: impl Into<String>,
        day_of_week: DayOfWeek,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
    ) -> Self {
        Self {
            id: id.into(),
            day_of_week,
            start_time,
            end_time,
            is_active: true,
        }
    }

    /// Marks the slot inactive.
    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    /// The slot as a time window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.day_of_week, self.start_time, self.end_time)
    }

    /// Duration in minutes.
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.window().duration_minutes()
    }
}
