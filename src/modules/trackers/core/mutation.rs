// Mutation engine: decide between insert and update under optimistic concurrency.
//
// Purpose
// - Persist a desired tracker state only if the writer saw the latest version.
//
// Responsibilities
// - Lock the target row without waiting and read its version (0 when absent).
// - Reject a mismatching expected version.
// - Insert on version 0, otherwise update conditioned on id and version.
//
// Boundaries
// - Begin, commit and rollback belong to the backend that owns the UnitOfWork.
//   Any error returned here means the backend must roll back.

use chrono::{DateTime, Utc};

use crate::modules::trackers::core::ports::StoreError;
use crate::modules::trackers::core::tracker::Tracker;

/// Row-level operations available inside one open unit of work.
pub trait UnitOfWork {
    /// Takes an exclusive lock on the row without waiting and returns its version.
    /// A missing row reads as version 0. Contention must surface as `StoreError::Locked`.
    fn lock_version(&mut self, id: u64) -> Result<u32, StoreError>;

    /// Inserts a fresh row with a new id, both timestamps set to `now`, and version 1.
    fn insert(&mut self, desired: &Tracker, now: DateTime<Utc>) -> Result<Tracker, StoreError>;

    /// Writes `end`, `name`, `updated_at` and `next_version` where id and `current_version`
    /// still match. Returns `None` when no row was affected.
    fn update_where_version(
        &mut self,
        desired: &Tracker,
        current_version: u32,
        next_version: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Tracker>, StoreError>;
}

pub fn apply_mutation<U>(
    uow: &mut U,
    desired: &Tracker,
    expected_version: u32,
    now: DateTime<Utc>,
) -> Result<Tracker, StoreError>
where
    U: UnitOfWork + ?Sized,
{
    let current = uow.lock_version(desired.id)?;

    if current != expected_version {
        return Err(StoreError::VersionConflict {
            id: desired.id,
            expected: expected_version,
            found: Some(current),
        });
    }

    if current == 0 {
        return uow.insert(desired, now);
    }

    let next_version = expected_version.checked_add(1).ok_or_else(|| {
        StoreError::Backend(format!("version counter exhausted for tracker {}", desired.id))
    })?;

    uow.update_where_version(desired, expected_version, next_version, now)?
        .ok_or(StoreError::VersionConflict {
            id: desired.id,
            expected: expected_version,
            found: None,
        })
}
