use axum::{
    Json, extract::State, extract::rejection::JsonRejection, http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::modules::trackers::adapters::inbound::http::{
    TrackerResponse, error_response, rejection_response,
};
use crate::modules::trackers::application::cancellation::with_deadline;
use crate::modules::trackers::use_cases::create_tracker::command::CreateTracker;
use crate::shell::state::AppState;

#[derive(Deserialize)]
pub struct CreateTrackerBody {
    pub start: DateTime<Utc>,
    #[serde(default)]
    pub name: String,
}

pub async fn handle(
    State(state): State<AppState>,
    body: Result<Json<CreateTrackerBody>, JsonRejection>,
) -> impl IntoResponse {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => {
            return rejection_response(StatusCode::UNPROCESSABLE_ENTITY, rejection.body_text());
        }
    };

    let command = CreateTracker {
        start: body.start,
        name: body.name,
    };

    let handler = state.create_handler.clone();
    let result = with_deadline(state.request_timeout, |cancel| async move {
        handler.handle(command, &cancel).await
    })
    .await;

    match result {
        Ok(tracker) => (StatusCode::CREATED, Json(TrackerResponse::from(tracker))).into_response(),
        Err(error) => error_response(error),
    }
}
