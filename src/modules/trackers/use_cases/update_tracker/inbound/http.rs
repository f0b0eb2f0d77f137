use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::modules::trackers::adapters::inbound::http::{
    TrackerResponse, error_response, rejection_response,
};
use crate::modules::trackers::application::cancellation::with_deadline;
use crate::modules::trackers::use_cases::update_tracker::command::UpdateTracker;
use crate::shell::state::AppState;

/// Absent fields are left as they are.
#[derive(Deserialize)]
pub struct UpdateTrackerBody {
    pub name: Option<String>,
    pub end: Option<DateTime<Utc>>,
    pub version: u32,
}

pub async fn handle(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<UpdateTrackerBody>, JsonRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return rejection_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return rejection_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let command = UpdateTracker {
        id,
        name: body.name,
        end: body.end,
        version: body.version,
    };

    let handler = state.update_handler.clone();
    let result = with_deadline(state.request_timeout, |cancel| async move {
        handler.handle(command, &cancel).await
    })
    .await;

    match result {
        Ok(tracker) => (StatusCode::OK, Json(TrackerResponse::from(tracker))).into_response(),
        Err(error) => error_response(error),
    }
}
