use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::modules::trackers::adapters::inbound::http::{
    TrackerResponse, error_response, rejection_response,
};
use crate::modules::trackers::application::cancellation::with_deadline;
use crate::shell::state::AppState;

pub async fn handle(
    State(state): State<AppState>,
    id: Result<Path<u64>, PathRejection>,
) -> impl IntoResponse {
    let Path(id) = match id {
        Ok(p) => p,
        Err(rejection) => {
            return rejection_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let handler = state.get_handler.clone();
    let result = with_deadline(state.request_timeout, |cancel| async move {
        handler.handle(id, &cancel).await
    })
    .await;

    match result {
        Ok(tracker) => (StatusCode::OK, Json(TrackerResponse::from(tracker))).into_response(),
        Err(error) => error_response(error),
    }
}
