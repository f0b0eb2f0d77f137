use async_graphql::{Context, ErrorExtensions, Object, Result as GqlResult};
use chrono::{DateTime, Utc};

use crate::modules::trackers::application::cancellation::with_deadline;
use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::tracker::Tracker;
use crate::modules::trackers::use_cases::create_tracker::command::CreateTracker;
use crate::modules::trackers::use_cases::update_tracker::command::UpdateTracker;
use crate::shell::state::AppState;

#[derive(async_graphql::SimpleObject, Clone)]
pub struct GqlTracker {
    pub id: u64,
    pub start: DateTime<Utc>,
    pub end: Option<DateTime<Utc>>,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u32,
}

impl From<Tracker> for GqlTracker {
    fn from(t: Tracker) -> Self {
        Self {
            id: t.id,
            start: t.start,
            end: t.end,
            name: t.name,
            created_at: t.meta.created_at(),
            updated_at: t.meta.updated_at(),
            version: t.meta.version(),
        }
    }
}

fn gql_error(error: ApplicationError) -> async_graphql::Error {
    let code = match &error {
        ApplicationError::TrackerNotFound(_) => "NOT_FOUND",
        ApplicationError::WrongVersion(_) => "WRONG_VERSION",
        ApplicationError::InvalidInterval(_) | ApplicationError::InvalidWindow => "BAD_INPUT",
        ApplicationError::UniqueViolation(_) => "UNIQUE_VIOLATION",
        ApplicationError::Cancelled => "CANCELLED",
        ApplicationError::Store(_) | ApplicationError::Unexpected(_) => "INTERNAL",
    };
    let retryable = error.is_retryable();
    async_graphql::Error::new(error.to_string()).extend_with(|_, e| {
        e.set("code", code);
        e.set("retryable", retryable);
    })
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn tracker(&self, context: &Context<'_>, id: u64) -> GqlResult<GqlTracker> {
        let state = context.data_unchecked::<AppState>();
        let handler = state.get_handler.clone();
        with_deadline(state.request_timeout, |cancel| async move {
            handler.handle(id, &cancel).await
        })
        .await
        .map(Into::into)
        .map_err(gql_error)
    }

    async fn trackers(
        &self,
        context: &Context<'_>,
        start_date: Option<DateTime<Utc>>,
        end_date: Option<DateTime<Utc>>,
    ) -> GqlResult<Vec<GqlTracker>> {
        let state = context.data_unchecked::<AppState>();
        let handler = state.list_handler.clone();
        let list = with_deadline(state.request_timeout, |cancel| async move {
            handler.handle(start_date, end_date, &cancel).await
        })
        .await
        .map_err(gql_error)?;
        Ok(list.into_iter().map(Into::into).collect())
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn create_tracker(
        &self,
        context: &Context<'_>,
        start: DateTime<Utc>,
        name: String,
    ) -> GqlResult<GqlTracker> {
        let state = context.data_unchecked::<AppState>();
        let handler = state.create_handler.clone();
        let command = CreateTracker { start, name };
        with_deadline(state.request_timeout, |cancel| async move {
            handler.handle(command, &cancel).await
        })
        .await
        .map(Into::into)
        .map_err(gql_error)
    }

    async fn update_tracker(
        &self,
        context: &Context<'_>,
        id: u64,
        version: u32,
        name: Option<String>,
        end: Option<DateTime<Utc>>,
    ) -> GqlResult<GqlTracker> {
        let state = context.data_unchecked::<AppState>();
        let handler = state.update_handler.clone();
        let command = UpdateTracker {
            id,
            name,
            end,
            version,
        };
        with_deadline(state.request_timeout, |cancel| async move {
            handler.handle(command, &cancel).await
        })
        .await
        .map(Into::into)
        .map_err(gql_error)
    }

    async fn delete_tracker(&self, context: &Context<'_>, id: u64) -> GqlResult<bool> {
        let state = context.data_unchecked::<AppState>();
        let handler = state.delete_handler.clone();
        with_deadline(state.request_timeout, |cancel| async move {
            handler.handle(id, &cancel).await
        })
        .await
        .map_err(gql_error)?;
        Ok(true)
    }
}
