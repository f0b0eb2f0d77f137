// Update handler orchestrates a versioned write.
//
// Responsibilities
// - Load the live tracker (missing or deleted means not found).
// - Apply only the fields the caller supplied.
// - Store with the caller's version and report conflicts as WrongVersion.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::cancellation::until_cancelled;
use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::{StoreError, TrackerQueries, TrackerStore};
use crate::modules::trackers::core::tracker::Tracker;
use crate::modules::trackers::use_cases::update_tracker::command::UpdateTracker;

pub struct UpdateTrackerHandler<TStore>
where
    TStore: TrackerStore + TrackerQueries + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> UpdateTrackerHandler<TStore>
where
    TStore: TrackerStore + TrackerQueries + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: UpdateTracker,
        cancel: &CancellationToken,
    ) -> Result<Tracker, ApplicationError> {
        let current = until_cancelled(cancel, self.store.get_by_id(command.id)).await?;

        // Version 0 would ask the engine for an insert.
        if command.version == 0 {
            return Err(ApplicationError::WrongVersion(StoreError::VersionConflict {
                id: command.id,
                expected: 0,
                found: Some(current.meta.version()),
            }));
        }

        let desired = current.apply_update(command.name, command.end)?;
        self.store
            .store(desired, command.version, cancel)
            .await
            .map_err(ApplicationError::from)
    }
}
