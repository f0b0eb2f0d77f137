// Create handler orchestrates the first write of a tracker.
//
// Responsibilities
// - Build an unpersisted tracker from the command.
// - Store it with expected version 0 so the engine inserts.
// - A conflict here cannot be the caller's fault, so it is reported as unexpected.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::{StoreError, TrackerStore};
use crate::modules::trackers::core::tracker::Tracker;
use crate::modules::trackers::use_cases::create_tracker::command::CreateTracker;

pub struct CreateTrackerHandler<TStore>
where
    TStore: TrackerStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> CreateTrackerHandler<TStore>
where
    TStore: TrackerStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn handle(
        &self,
        command: CreateTracker,
        cancel: &CancellationToken,
    ) -> Result<Tracker, ApplicationError> {
        let draft = Tracker::new(command.start, command.name);
        self.store
            .store(draft, 0, cancel)
            .await
            .map_err(|error| match error {
                StoreError::VersionConflict { .. } | StoreError::Locked { .. } => {
                    ApplicationError::Unexpected(error.to_string())
                }
                other => other.into(),
            })
    }
}
