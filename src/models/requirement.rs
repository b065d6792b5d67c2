//! Session requirements.
//!
//! A session requirement is one unit of "this course needs one more
//! teaching session this week". Each course expands into
//! `sessions_per_week` identical requirements, and these are the
//! variables every search strategy assigns.

use serde::{Deserialize, Serialize};

use super::Course;

/// One weekly session a course still needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequirement {
    /// Stable identifier, `"<course code>#<ordinal>"`.
    pub id: String,
    /// Course this session belongs to.
    pub course_code: String,
    /// 1-based ordinal within the course's weekly sessions.
    pub ordinal: u32,
    /// Position of the course in the catalog snapshot.
    #[serde(skip)]
    pub course_index: usize,
}

impl SessionRequirement {
    /// Builds the requirement id for a course session.
    pub fn make_id(course_code: &str, ordinal: u32) -> String {
        format!("{course_code}#{ordinal}")
    }

    /// Expands courses into their session requirements, in catalog order.
    pub fn expand(courses: &[Course]) -> Vec<Self> {
        courses
            .iter()
            .enumerate()
            .flat_map(|(course_index, course)| {
                (1..=course.sessions_per_week()).map(move |ordinal| SessionRequirement {
                    id: Self::make_id(&course.code, ordinal),
                    course_code: course.code.clone(),
                    ordinal,
                    course_index,
                })
            })
            .collect()
    }
}
