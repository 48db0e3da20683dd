use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Color tag tying a deadline to its course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CourseColor {
    Blue,
    Teal,
    Violet,
    Pink,
    Red,
    Orange,
    Green,
}

/// A single graded task with a due date.
///
/// Produced by a deadline source, immutable once fetched; owned by the cache
/// entry of the week it falls into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    pub id: String,
    pub subject_name: String,
    pub task_text: String,
    pub due_date: DateTime<Utc>,
    pub course_color: CourseColor,
}

/// One week's deadlines grouped by calendar day.
///
/// Serializes as a map keyed by `YYYY-MM-DD`; days without deadlines are
/// absent rather than mapped to empty lists.
pub type DeadlinesByDay = BTreeMap<NaiveDate, Vec<Deadline>>;
