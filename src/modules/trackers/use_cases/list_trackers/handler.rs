use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::cancellation::until_cancelled;
use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::TrackerQueries;
use crate::modules::trackers::core::tracker::Tracker;

pub struct ListTrackersHandler<TQueries>
where
    TQueries: TrackerQueries + ?Sized + 'static,
{
    queries: Arc<TQueries>,
}

impl<TQueries> ListTrackersHandler<TQueries>
where
    TQueries: TrackerQueries + ?Sized + 'static,
{
    pub fn new(queries: Arc<TQueries>) -> Self {
        Self { queries }
    }

    /// Without bounds every live tracker is returned.
    pub async fn handle(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<Tracker>, ApplicationError> {
        if matches!((start, end), (Some(start), Some(end)) if start > end) {
            return Err(ApplicationError::InvalidWindow);
        }
        until_cancelled(cancel, self.queries.list_by_window(start, end)).await
    }
}
