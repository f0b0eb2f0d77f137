// Tracker is one recorded time interval plus the bookkeeping the store maintains.
//
// Lifecycle
// - Built in memory with id 0 and version 0.
// - The store assigns id, created_at and updated_at on the first successful insert.
// - Updates only touch end, name, updated_at and version. Deletes only flip `deleted`.
//
// Boundaries
// - No input or output here.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TrackerError {
    #[error("end time must not be before start time")]
    InvalidInterval,
}

/// Store-owned metadata. Callers never set these fields directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    deleted: bool,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
    version: u32,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hydrate(
        deleted: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u32,
    ) -> Self {
        Self {
            deleted,
            created_at: Some(created_at),
            updated_at: Some(updated_at),
            version,
        }
    }

    pub fn deleted(&self) -> bool {
        self.deleted
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn version(&self) -> u32 {
        self.version
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tracker {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub name: String,
    pub meta: Meta,
}

impl Tracker {
    pub fn new(start: DateTime<Utc>, name: impl Into<String>) -> Self {
        Self {
            id: 0,
            start,
            end: None,
            name: name.into(),
            meta: Meta::new(),
        }
    }

    /// Returns the desired next state. `None` leaves a field as it is.
    pub fn apply_update(
        &self,
        name: Option<String>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Tracker, TrackerError> {
        let mut next = self.clone();
        if let Some(end) = end {
            if end < next.start {
                return Err(TrackerError::InvalidInterval);
            }
            next.end = Some(end);
        }
        if let Some(name) = name {
            next.name = name;
        }
        Ok(next)
    }
}
