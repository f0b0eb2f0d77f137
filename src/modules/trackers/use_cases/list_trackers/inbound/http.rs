use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::modules::trackers::adapters::inbound::http::{
    TrackerResponse, error_response, rejection_response,
};
use crate::modules::trackers::application::cancellation::with_deadline;
use crate::shell::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListTrackersParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

fn parse_bound(name: &str, raw: Option<String>) -> Result<Option<DateTime<Utc>>, String> {
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|err| format!("{name} must be an RFC 3339 timestamp: {err}")),
    }
}

pub async fn handle(
    State(state): State<AppState>,
    params: Result<Query<ListTrackersParams>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(q) => q,
        Err(rejection) => {
            return rejection_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    let (start, end) = match (
        parse_bound("start_date", params.start_date),
        parse_bound("end_date", params.end_date),
    ) {
        (Ok(start), Ok(end)) => (start, end),
        (Err(detail), _) | (_, Err(detail)) => {
            return rejection_response(StatusCode::BAD_REQUEST, detail);
        }
    };

    let handler = state.list_handler.clone();
    let result = with_deadline(state.request_timeout, |cancel| async move {
        handler.handle(start, end, &cancel).await
    })
    .await;

    match result {
        Ok(trackers) => {
            let body: Vec<TrackerResponse> = trackers.into_iter().map(Into::into).collect();
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(error) => error_response(error),
    }
}
