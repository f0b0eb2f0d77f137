// Soft delete. Last writer wins on the deleted flag; no version is checked.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::TrackerStore;

pub struct DeleteTrackerHandler<TStore>
where
    TStore: TrackerStore + ?Sized + 'static,
{
    store: Arc<TStore>,
}

impl<TStore> DeleteTrackerHandler<TStore>
where
    TStore: TrackerStore + ?Sized + 'static,
{
    pub fn new(store: Arc<TStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self, id: u64, cancel: &CancellationToken) -> Result<(), ApplicationError> {
        self.store
            .delete(id, cancel)
            .await
            .map_err(ApplicationError::from)
    }
}
