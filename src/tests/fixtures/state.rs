use std::sync::Arc;
use std::time::Duration;

use crate::modules::trackers::adapters::outbound::tracker_store_in_memory::InMemoryTrackerStore;
use crate::shell::state::AppState;

pub fn app_state(store: Arc<InMemoryTrackerStore>) -> AppState {
    AppState::new(store, Duration::from_secs(5))
}

pub fn offline_app_state() -> AppState {
    let mut store = InMemoryTrackerStore::new();
    store.toggle_offline();
    app_state(Arc::new(store))
}
