// Transport pieces shared by the tracker HTTP handlers.
//
// Responsibilities
// - Map trackers to the JSON shape clients see.
// - Map ApplicationError kinds to status codes and log failed requests.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::tracker::Tracker;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerResponse {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u32,
}

impl From<Tracker> for TrackerResponse {
    fn from(tracker: Tracker) -> Self {
        Self {
            id: tracker.id,
            start: tracker.start,
            end: tracker.end,
            name: tracker.name,
            created_at: tracker.meta.created_at(),
            updated_at: tracker.meta.updated_at(),
            version: tracker.meta.version(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn status_for(error: &ApplicationError) -> StatusCode {
    match error {
        ApplicationError::TrackerNotFound(_) => StatusCode::NOT_FOUND,
        ApplicationError::WrongVersion(_) | ApplicationError::UniqueViolation(_) => {
            StatusCode::CONFLICT
        }
        ApplicationError::InvalidInterval(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ApplicationError::InvalidWindow => StatusCode::BAD_REQUEST,
        ApplicationError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        ApplicationError::Store(_) | ApplicationError::Unexpected(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_response(error: ApplicationError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        tracing::error!(%status, error = %error, "tracker request failed");
    } else {
        tracing::warn!(
            %status,
            error = %error,
            retryable = error.is_retryable(),
            "tracker request rejected"
        );
    }
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}

/// Malformed path, query or body. Never reaches the handlers.
pub fn rejection_response(status: StatusCode, detail: String) -> Response {
    tracing::warn!(%status, detail = %detail, "tracker request rejected");
    (status, Json(ErrorBody { error: detail })).into_response()
}
