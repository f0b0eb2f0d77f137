use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::application::errors::ApplicationError;

/// Runs a read until it finishes or the caller gives up, whichever comes first.
pub async fn until_cancelled<F, T, E>(
    cancel: &CancellationToken,
    work: F,
) -> Result<T, ApplicationError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<ApplicationError>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(ApplicationError::Cancelled),
        result = work => result.map_err(Into::into),
    }
}

/// Gives `work` a fresh token and a deadline. The token is cancelled when the deadline
/// passes or the caller goes away, so an in-flight unit of work rolls back.
pub async fn with_deadline<F, Fut, T>(deadline: Duration, work: F) -> Result<T, ApplicationError>
where
    F: FnOnce(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, ApplicationError>>,
{
    let cancel = CancellationToken::new();
    let _cancel_on_exit = cancel.clone().drop_guard();
    match tokio::time::timeout(deadline, work(cancel)).await {
        Ok(result) => result,
        Err(_) => Err(ApplicationError::Cancelled),
    }
}
