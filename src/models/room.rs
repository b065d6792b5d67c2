//! Room model.
//!
//! Rooms are shared resources: no two sessions may occupy the same
//! room at overlapping times.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{DepartmentId, SessionType};

/// A teaching room.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Seats available (must be at least 1).
    pub capacity: i32,
    /// Room classification.
    #[serde(rename = "type", alias = "roomType")]
    pub room_type: RoomType,
    /// Restricts the room to one department's courses.
    #[serde(default)]
    pub department: Option<DepartmentId>,
}

/// Room classification.
///
/// `"lecture"` is accepted for theory rooms and `"lab"` for practical ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoomType {
    /// Lecture room.
    Theory,
    /// Laboratory / workshop.
    Practical,
    /// Domain-specific type.
    Custom(String),
}

impl RoomType {
    /// Default room type for a session type.
    pub fn for_session(session_type: SessionType) -> Self {
        match session_type {
            SessionType::Theory => RoomType::Theory,
            SessionType::Practical => RoomType::Practical,
        }
    }
}

impl From<String> for RoomType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "theory" | "lecture" => RoomType::Theory,
            "practical" | "lab" | "laboratory" => RoomType::Practical,
            other => RoomType::Custom(other.to_string()),
        }
    }
}

impl From<RoomType> for String {
    fn from(value: RoomType) -> Self {
        value.to_string()
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoomType::Theory => f.write_str("theory"),
            RoomType::Practical => f.write_str("practical"),
            RoomType::Custom(name) => f.write_str(name),
        }
    }
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, capacity: i32, room_type: RoomType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            capacity,
            room_type,
            department: None,
        }
    }

    /// Sets the room name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Restricts the room to a department.
    pub fn with_department(mut self, department: impl AsRef<str>) -> Self {
        self.department = Some(DepartmentId::new(department));
        self
    }

    /// Whether a course of `department` may use this room.
    pub fn admits_department(&self, department: &DepartmentId) -> bool {
        self.department.as_ref().map_or(true, |d| d == department)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_aliases() {
        assert_eq!(RoomType::from("Lecture".to_string()), RoomType::Theory);
        assert_eq!(RoomType::from("lab".to_string()), RoomType::Practical);
        assert_eq!(
            RoomType::from("Studio".to_string()),
            RoomType::Custom("studio".into())
        );
    }

    #[test]
    fn test_room_deserialize() {
        let json = r#"{"id":"R1","capacity":40,"type":"theory","department":"cs"}"#;
        let room: Room = serde_json::from_str(json).unwrap();
        assert_eq!(room.room_type, RoomType::Theory);
        assert!(room.admits_department(&DepartmentId::new("CS")));
        assert!(!room.admits_department(&DepartmentId::new("MATH")));
    }

    #[test]
    fn test_unrestricted_room_admits_all() {
        let room = Room::new("R1", 40, RoomType::Theory);
        assert!(room.admits_department(&DepartmentId::new("ANY")));
    }
}
