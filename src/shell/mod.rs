// Composition root for the trackers bounded context.
//
// Responsibilities
// - Read config from environment.
// - Instantiate the configured persistence backend.
// - Wire it into the use case handlers and the transport adapters.

pub mod config;
pub mod graphql;
pub mod http;
pub mod state;

use anyhow::Context;
use std::sync::Arc;

use crate::modules::trackers::adapters::outbound::tracker_store_in_memory::InMemoryTrackerStore;
use crate::modules::trackers::adapters::outbound::tracker_store_sqlite::SqliteTrackerStore;
use crate::modules::trackers::core::ports::TrackerRepository;
use crate::shared::infrastructure::database::Database;
use crate::shell::config::{Config, StoreKind};
use crate::shell::state::AppState;

pub fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let repository: Arc<dyn TrackerRepository> = match config.store {
        StoreKind::Memory => Arc::new(InMemoryTrackerStore::new()),
        StoreKind::Sqlite => {
            let db = Database::new(&config.database_path).with_context(|| {
                format!("failed to open {}", config.database_path.display())
            })?;
            Arc::new(SqliteTrackerStore::new(db))
        }
    };
    tracing::info!(store = ?config.store, "tracker store ready");
    Ok(AppState::new(repository, config.request_timeout))
}
