use thiserror::Error;

use crate::modules::trackers::core::ports::StoreError;
use crate::modules::trackers::core::tracker::TrackerError;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error("tracker {0} not found")]
    TrackerNotFound(u64),

    /// The supplied version is stale, or another writer holds the row right now.
    #[error("wrong version provided: {0}")]
    WrongVersion(#[source] StoreError),

    #[error(transparent)]
    InvalidInterval(#[from] TrackerError),

    #[error("window start must not be after window end")]
    InvalidWindow,

    #[error("{0}")]
    UniqueViolation(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(StoreError),

    #[error("unexpected: {0}")]
    Unexpected(String),
}

impl ApplicationError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApplicationError::WrongVersion(_))
    }
}

impl From<StoreError> for ApplicationError {
    /// Default translation. Handlers override the kinds whose meaning depends on the operation.
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => ApplicationError::TrackerNotFound(id),
            StoreError::VersionConflict { .. } | StoreError::Locked { .. } => {
                ApplicationError::WrongVersion(error)
            }
            StoreError::UniqueViolation(detail) => ApplicationError::UniqueViolation(detail),
            StoreError::Cancelled => ApplicationError::Cancelled,
            StoreError::Backend(_) => ApplicationError::Store(error),
        }
    }
}
