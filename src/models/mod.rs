//! Timetabling domain models.
//!
//! Provides the catalog entities handed to the engine and the schedule
//! types it produces. Catalog entities are read-only inputs; schedules
//! are created fresh on each generation run.
//!
//! # Domain Mappings
//!
//! | u-timetable | Generic scheduling |
//! |-------------|--------------------|
//! | SessionRequirement | Activity |
//! | Teacher / Room | Resource |
//! | TimeSlot | Time bucket |
//! | Schedule | Solution |

mod calendar;
mod course;
mod department;
mod requirement;
mod room;
mod schedule;
mod teacher;
mod time_slot;

pub use calendar::{DayOfWeek, TimeOfDay, TimeWindow};
pub use course::{hours_to_minutes, Course, SessionType, DEFAULT_SESSION_MINUTES};
pub use department::{Department, DepartmentId, DepartmentRef};
pub use requirement::SessionRequirement;
pub use room::{Room, RoomType};
pub use schedule::{Assignment, Conflict, ConflictKind, Schedule};
pub use teacher::{Teacher, DEFAULT_MAX_HOURS};
pub use time_slot::TimeSlot;
