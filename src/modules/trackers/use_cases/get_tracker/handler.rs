use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::cancellation::until_cancelled;
use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::TrackerQueries;
use crate::modules::trackers::core::tracker::Tracker;

pub struct GetTrackerHandler<TQueries>
where
    TQueries: TrackerQueries + ?Sized + 'static,
{
    queries: Arc<TQueries>,
}

impl<TQueries> GetTrackerHandler<TQueries>
where
    TQueries: TrackerQueries + ?Sized + 'static,
{
    pub fn new(queries: Arc<TQueries>) -> Self {
        Self { queries }
    }

    pub async fn handle(
        &self,
        id: u64,
        cancel: &CancellationToken,
    ) -> Result<Tracker, ApplicationError> {
        until_cancelled(cancel, self.queries.get_by_id(id)).await
    }
}
