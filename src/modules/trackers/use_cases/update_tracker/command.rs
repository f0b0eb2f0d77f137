// Command data type for changing an existing tracker.
//
// Notes
// - `None` means "leave as is". `Some(String::new())` really sets an empty name.
// - `version` is the version the caller last observed.

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTracker {
    pub id: u64,
    pub name: Option<String>,
    pub end: Option<DateTime<Utc>>,
    pub version: u32,
}
