use axum::{
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::IntoResponse,
};

use crate::modules::trackers::adapters::inbound::http::{error_response, rejection_response};
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

    let handler = state.delete_handler.clone();
    let result = with_deadline(state.request_timeout, |cancel| async move {
        handler.handle(id, &cancel).await
    })
    .await;

    match result {
        Ok(()) => StatusCode::OK.into_response(),
        Err(error) => error_response(error),
    }
}
