// Command data type for starting a new tracker.
//
// Purpose
// - Carry the caller's intent: when the interval started and what to call it.
// - Stay independent of the transport (not tied to HTTP or GraphQL).

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTracker {
    pub start: DateTime<Utc>,
    pub name: String,
}
