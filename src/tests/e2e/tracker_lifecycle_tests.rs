use crate::modules::trackers::adapters::outbound::tracker_store_in_memory::InMemoryTrackerStore;
use crate::modules::trackers::adapters::outbound::tracker_store_sqlite::SqliteTrackerStore;
use crate::modules::trackers::application::errors::ApplicationError;
use crate::modules::trackers::core::ports::TrackerRepository;
use crate::shared::infrastructure::database::Database;
use crate::shell::state::AppState;
use crate::tests::fixtures::commands::{CreateTrackerBuilder, UpdateTrackerBuilder};
use crate::tests::fixtures::trackers::at;
use rstest::rstest;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn in_memory() -> Arc<dyn TrackerRepository> {
    Arc::new(InMemoryTrackerStore::new())
}

fn sqlite() -> Arc<dyn TrackerRepository> {
    Arc::new(SqliteTrackerStore::new(Database::open_in_memory().unwrap()))
}

#[rstest]
#[case::in_memory(in_memory)]
#[case::sqlite(sqlite)]
#[tokio::test]
async fn tracks_a_tracker_through_its_lifecycle(#[case] repository: fn() -> Arc<dyn TrackerRepository>) {
    let state = AppState::new(repository(), Duration::from_secs(5));
    let cancel = CancellationToken::new();

    let a = state
        .create_handler
        .handle(CreateTrackerBuilder::new().build(), &cancel)
        .await
        .unwrap();
    assert_eq!((a.id, a.meta.version()), (1, 1));
    assert_eq!(a.meta.created_at(), a.meta.updated_at());

    // Keeps B strictly after A in creation order on coarse clocks.
    tokio::time::sleep(Duration::from_millis(2)).await;
    let b = state
        .create_handler
        .handle(
            CreateTrackerBuilder::new()
                .start(at("2020-05-16T00:00:00Z"))
                .name("t2")
                .build(),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!((b.id, b.meta.version()), (2, 1));

    let window = state
        .list_handler
        .handle(
            Some(at("2020-05-15T00:00:01Z")),
            Some(at("2020-05-16T10:00:01Z")),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(window.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);

    let all = state.list_handler.handle(None, None, &cancel).await.unwrap();
    assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![a.id, b.id]);

    let updated = state
        .update_handler
        .handle(
            UpdateTrackerBuilder::new(a.id)
                .end(at("2020-05-15T10:00:00Z"))
                .version(1)
                .build(),
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(updated.meta.version(), 2);
    assert_eq!(updated.end, Some(at("2020-05-15T10:00:00Z")));
    assert_eq!(updated.name, "t1");

    let stale = state
        .update_handler
        .handle(
            UpdateTrackerBuilder::new(a.id).name("lost").version(1).build(),
            &cancel,
        )
        .await;
    assert!(matches!(stale, Err(ApplicationError::WrongVersion(_))));
    assert_eq!(
        state.get_handler.handle(a.id, &cancel).await.unwrap(),
        updated
    );

    state.delete_handler.handle(a.id, &cancel).await.unwrap();
    assert_eq!(
        state.get_handler.handle(a.id, &cancel).await,
        Err(ApplicationError::TrackerNotFound(a.id))
    );
    let remaining = state.list_handler.handle(None, None, &cancel).await.unwrap();
    assert_eq!(remaining.iter().map(|t| t.id).collect::<Vec<_>>(), vec![b.id]);
}

#[rstest]
#[case::in_memory(in_memory)]
#[case::sqlite(sqlite)]
#[tokio::test]
async fn leaves_every_tracker_untouched_once_cancelled(
    #[case] repository: fn() -> Arc<dyn TrackerRepository>,
) {
    let state = AppState::new(repository(), Duration::from_secs(5));
    let created = state
        .create_handler
        .handle(CreateTrackerBuilder::new().build(), &CancellationToken::new())
        .await
        .unwrap();
    let cancelled = CancellationToken::new();
    cancelled.cancel();

    assert_eq!(
        state.get_handler.handle(created.id, &cancelled).await,
        Err(ApplicationError::Cancelled)
    );
    assert_eq!(
        state.list_handler.handle(None, None, &cancelled).await,
        Err(ApplicationError::Cancelled)
    );
    assert_eq!(
        state
            .create_handler
            .handle(CreateTrackerBuilder::new().name("t2").build(), &cancelled)
            .await,
        Err(ApplicationError::Cancelled)
    );
    assert_eq!(
        state
            .update_handler
            .handle(
                UpdateTrackerBuilder::new(created.id).name("renamed").build(),
                &cancelled
            )
            .await,
        Err(ApplicationError::Cancelled)
    );
    assert_eq!(
        state.delete_handler.handle(created.id, &cancelled).await,
        Err(ApplicationError::Cancelled)
    );

    let live = CancellationToken::new();
    let all = state.list_handler.handle(None, None, &live).await.unwrap();
    assert_eq!(all, vec![created]);
}
