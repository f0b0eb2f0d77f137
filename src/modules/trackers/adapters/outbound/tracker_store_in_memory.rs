// In memory implementation of the TrackerStore and TrackerQueries ports.
//
// Purpose
// - Support handler tests and local development without a database.
//
// Responsibilities
// - Keep tracker rows in a table keyed by id, with a sequence for new ids.
// - Give every row its own lock; writers try it without waiting. A lock entry
//   is forgotten once nobody holds or waits on it.
// - Stage writes and commit them only after the cancellation check.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::core::mutation::{UnitOfWork, apply_mutation};
use crate::modules::trackers::core::ports::{StoreError, TrackerQueries, TrackerStore};
use crate::modules::trackers::core::tracker::{Meta, Tracker};
use crate::shared::core::primitives::{Clock, SystemClock};

#[derive(Default)]
struct TrackerTable {
    rows: BTreeMap<u64, Tracker>,
    last_id: u64,
}

type RowLocks = std::sync::Mutex<HashMap<u64, Arc<Mutex<()>>>>;

/// Handle on one row lock, holding the guard once acquired.
struct RowGuard<'a> {
    locks: &'a RowLocks,
    id: u64,
    lock: Arc<Mutex<()>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for RowGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Referenced only by the map and this handle.
        let unused = locks
            .get(&self.id)
            .is_some_and(|lock| Arc::ptr_eq(lock, &self.lock))
            && Arc::strong_count(&self.lock) == 2;
        if unused {
            locks.remove(&self.id);
        }
    }
}

pub struct InMemoryTrackerStore {
    table: RwLock<TrackerTable>,
    row_locks: RowLocks,
    clock: Arc<dyn Clock>,
    delay_store_ms: AtomicU64,
    is_offline: bool,
}

impl Default for InMemoryTrackerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTrackerStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: RwLock::new(TrackerTable::default()),
            row_locks: std::sync::Mutex::new(HashMap::new()),
            clock,
            delay_store_ms: AtomicU64::new(0),
            is_offline: false,
        }
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    /// Holds the row lock this long before writing.
    pub fn set_delay_store_ms(&self, ms: u64) {
        self.delay_store_ms.store(ms, Ordering::Relaxed);
    }

    /// Loads rows verbatim with their own ids. The id sequence is left alone.
    pub async fn seed(&self, rows: impl IntoIterator<Item = Tracker>) {
        let mut table = self.table.write().await;
        for row in rows {
            table.rows.insert(row.id, row);
        }
    }

    fn ensure_online(&self) -> Result<(), StoreError> {
        if self.is_offline {
            return Err(StoreError::Backend("Tracker store offline".into()));
        }
        Ok(())
    }

    fn row_lock(&self, id: u64) -> RowGuard<'_> {
        let lock = self
            .row_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(id)
            .or_default()
            .clone();
        RowGuard {
            locks: &self.row_locks,
            id,
            lock,
            guard: None,
        }
    }

    fn try_lock_row(&self, id: u64) -> Result<RowGuard<'_>, StoreError> {
        let mut row = self.row_lock(id);
        let guard = row.lock.clone().try_lock_owned().map_err(|_| {
            tracing::debug!(tracker_id = id, "row lock unavailable");
            StoreError::Locked { id }
        })?;
        row.guard = Some(guard);
        Ok(row)
    }
}

/// Reads from the committed table and keeps writes aside until commit.
struct StagedUnitOfWork<'a> {
    table: &'a TrackerTable,
    staged: Option<Tracker>,
    last_id: u64,
}

impl<'a> StagedUnitOfWork<'a> {
    fn new(table: &'a TrackerTable) -> Self {
        Self {
            table,
            staged: None,
            last_id: table.last_id,
        }
    }

    fn into_parts(self) -> (Option<Tracker>, u64) {
        (self.staged, self.last_id)
    }
}

impl UnitOfWork for StagedUnitOfWork<'_> {
    fn lock_version(&mut self, id: u64) -> Result<u32, StoreError> {
        // The row lock is already held by the caller for the whole unit of work.
        Ok(self
            .table
            .rows
            .get(&id)
            .map(|row| row.meta.version())
            .unwrap_or(0))
    }

    fn insert(&mut self, desired: &Tracker, now: DateTime<Utc>) -> Result<Tracker, StoreError> {
        let id = self.last_id + 1;
        self.last_id = id;
        if self.table.rows.contains_key(&id) {
            return Err(StoreError::UniqueViolation(format!(
                "time_tracker.id {id} already exists"
            )));
        }
        let row = Tracker {
            id,
            start: desired.start,
            end: desired.end,
            name: desired.name.clone(),
            meta: Meta::hydrate(false, now, now, 1),
        };
        self.staged = Some(row.clone());
        Ok(row)
    }

    fn update_where_version(
        &mut self,
        desired: &Tracker,
        current_version: u32,
        next_version: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Tracker>, StoreError> {
        let Some(current) = self.table.rows.get(&desired.id) else {
            return Ok(None);
        };
        if current.meta.version() != current_version {
            return Ok(None);
        }
        let created_at = current.meta.created_at().unwrap_or(now);
        let row = Tracker {
            id: current.id,
            start: current.start,
            end: desired.end,
            name: desired.name.clone(),
            meta: Meta::hydrate(current.meta.deleted(), created_at, now, next_version),
        };
        self.staged = Some(row.clone());
        Ok(Some(row))
    }
}

#[async_trait]
impl TrackerStore for InMemoryTrackerStore {
    async fn store(
        &self,
        desired: Tracker,
        expected_version: u32,
        cancel: &CancellationToken,
    ) -> Result<Tracker, StoreError> {
        self.ensure_online()?;
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        // Nothing to lock for a row that cannot exist yet.
        let _row_guard = match desired.id {
            0 => None,
            id => Some(self.try_lock_row(id)?),
        };

        let delay = self.delay_store_ms.load(Ordering::Relaxed);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        let mut table = self.table.write().await;
        let mut uow = StagedUnitOfWork::new(&table);
        let result = apply_mutation(&mut uow, &desired, expected_version, self.clock.now());
        let (staged, last_id) = uow.into_parts();
        // Like a database sequence, a consumed id is never handed out again.
        table.last_id = last_id;
        let stored = result?;

        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        if let Some(row) = staged {
            table.rows.insert(row.id, row);
        }
        tracing::debug!(
            tracker_id = stored.id,
            version = stored.meta.version(),
            "tracker committed"
        );
        Ok(stored)
    }

    async fn delete(&self, id: u64, cancel: &CancellationToken) -> Result<(), StoreError> {
        self.ensure_online()?;
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let mut row_guard = self.row_lock(id);
        let waiting = row_guard.lock.clone().lock_owned();
        row_guard.guard = Some(tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            guard = waiting => guard,
        });

        let mut table = self.table.write().await;
        let now = self.clock.now();
        let row = table.rows.get_mut(&id).ok_or(StoreError::NotFound { id })?;
        let created_at = row.meta.created_at().unwrap_or(now);
        row.meta = Meta::hydrate(true, created_at, now, row.meta.version());
        tracing::debug!(tracker_id = id, "tracker soft deleted");
        Ok(())
    }
}

#[async_trait]
impl TrackerQueries for InMemoryTrackerStore {
    async fn get_by_id(&self, id: u64) -> Result<Tracker, StoreError> {
        self.ensure_online()?;
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .filter(|row| !row.meta.deleted())
            .cloned()
            .ok_or(StoreError::NotFound { id })
    }

    async fn list_by_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Tracker>, StoreError> {
        self.ensure_online()?;
        let table = self.table.read().await;
        let mut items: Vec<Tracker> = table
            .rows
            .values()
            .filter(|row| !row.meta.deleted())
            .filter(|row| start.is_none_or(|lower| row.start >= lower))
            .filter(|row| end.is_none_or(|upper| row.start <= upper))
            .cloned()
            .collect();
        items.sort_by_key(|row| (row.meta.created_at(), row.id));
        Ok(items)
    }
}
