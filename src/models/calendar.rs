//! Weekly calendar primitives.
//!
//! A timetable repeats every week, so time is modelled as a day of the
//! week plus a minute offset within that day.
//!
//! # Time Model
//! [`TimeOfDay`] is minutes since midnight and serializes as `"HH:MM"`.
//! [`TimeWindow`] is a half-open interval `[start, end)` on one day.
//!
//! # Overlap
//! Two windows conflict iff they fall on the same day and
//! `s1 < e2 && s2 < e1`. Adjoining windows (`[9:00,10:00)` and
//! `[10:00,11:00)`) do not overlap.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    /// All days, Monday first.
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Monday through Friday.
    pub const WEEKDAYS: [DayOfWeek; 5] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
    ];

    /// Zero-based index (Monday = 0).
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
            DayOfWeek::Sunday => "sunday",
        };
        f.write_str(name)
    }
}

/// A time of day in minutes since midnight.
///
/// Valid range is `0..=1440`; `24:00` is accepted as an end-of-day bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u32);

impl TimeOfDay {
    /// Minutes in a day.
    pub const MINUTES_PER_DAY: u32 = 24 * 60;

    /// Creates a time from hours and minutes.
    ///
    /// # Panics
    /// Panics if the result lies past `24:00`. Use [`TimeOfDay::parse`]
    /// for untrusted input.
    pub fn hm(hours: u32, minutes: u32) -> Self {
        let total = hours * 60 + minutes;
        assert!(
            minutes < 60 && total <= Self::MINUTES_PER_DAY,
            "invalid time of day {hours}:{minutes:02}"
        );
        Self(total)
    }

    /// Creates a time from a raw minute offset, if in range.
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= Self::MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Minutes since midnight.
    #[inline]
    pub fn minutes(self) -> u32 {
        self.0
    }

    /// Parses `"H:MM"` or `"HH:MM"` (an optional `":SS"` suffix is ignored).
    pub fn parse(s: &str) -> Result<Self, String> {
        let mut parts = s.trim().split(':');
        let hours = parts
            .next()
            .and_then(|h| h.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid time '{s}': expected HH:MM"))?;
        let minutes = parts
            .next()
            .and_then(|m| m.parse::<u32>().ok())
            .ok_or_else(|| format!("invalid time '{s}': expected HH:MM"))?;
        if minutes >= 60 || hours * 60 + minutes > Self::MINUTES_PER_DAY {
            return Err(format!("invalid time '{s}': out of range"));
        }
        Ok(Self(hours * 60 + minutes))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// A half-open interval `[start, end)` on one day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    /// Day the window falls on.
    pub day_of_week: DayOfWeek,
    /// Interval start (inclusive).
    pub start_time: TimeOfDay,
    /// Interval end (exclusive).
    pub end_time: TimeOfDay,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(day_of_week: DayOfWeek, start_time: TimeOfDay, end_time: TimeOfDay) -> Self {
        Self {
            day_of_week,
            start_time,
            end_time,
        }
    }

    /// Duration in minutes (zero for malformed windows).
    #[inline]
    pub fn duration_minutes(&self) -> u32 {
        self.end_time.minutes().saturating_sub(self.start_time.minutes())
    }

    /// Whether `start < end`.
    #[inline]
    pub fn is_well_formed(&self) -> bool {
        self.start_time < self.end_time
    }

    /// Whether two windows overlap (same day, `s1 < e2 && s2 < e1`).
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    /// Whether `other` lies entirely within this window.
    #[inline]
    pub fn covers(&self, other: &Self) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time <= other.start_time
            && other.end_time <= self.end_time
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}-{}", self.day_of_week, self.start_time, self.end_time)
    }
}
