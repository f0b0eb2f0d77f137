// Ports define what the tracker core needs from persistence, without implementing it.
//
// Purpose
// - TrackerStore: the write side. Every mutation goes through here.
// - TrackerQueries: the read side. Never takes locks.
//
// Boundaries
// - No concrete input or output here. Adapters in adapters/outbound implement these traits.
//
// Testing guidance
// - The in memory adapter supports tests and local development.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::core::tracker::Tracker;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("tracker {id} not found")]
    NotFound { id: u64 },

    #[error("version conflict on tracker {id}: expected {expected}, found {found:?}")]
    VersionConflict {
        id: u64,
        expected: u32,
        found: Option<u32>,
    },

    #[error("tracker {id} is locked by another writer")]
    Locked { id: u64 },

    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    #[error("unit of work cancelled before commit")]
    Cancelled,

    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// Callers may re-read and try again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::VersionConflict { .. } | StoreError::Locked { .. }
        )
    }
}

#[async_trait]
pub trait TrackerStore: Send + Sync {
    /// Inserts when `expected_version` is 0, otherwise updates the row at exactly that version.
    async fn store(
        &self,
        desired: Tracker,
        expected_version: u32,
        cancel: &CancellationToken,
    ) -> Result<Tracker, StoreError>;

    async fn delete(&self, id: u64, cancel: &CancellationToken) -> Result<(), StoreError>;
}

#[async_trait]
pub trait TrackerQueries: Send + Sync {
    async fn get_by_id(&self, id: u64) -> Result<Tracker, StoreError>;

    /// Live trackers whose start lies in `[start, end]`, oldest creation first.
    /// A missing bound is unbounded.
    async fn list_by_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Tracker>, StoreError>;
}

pub trait TrackerRepository: TrackerStore + TrackerQueries {}

impl<T> TrackerRepository for T where T: TrackerStore + TrackerQueries {}
