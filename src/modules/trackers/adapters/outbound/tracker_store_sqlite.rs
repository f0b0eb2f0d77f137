// SQLite implementation of the TrackerStore and TrackerQueries ports.
//
// Responsibilities
// - Run each mutation in a `BEGIN IMMEDIATE` transaction. With the zero busy timeout set by
//   the database worker, a held write lock surfaces as `StoreError::Locked` right away.
// - Check cancellation after the engine decided and before commit. Dropping the transaction
//   rolls it back.
// - Store timestamps as fixed width RFC 3339 text so that text order equals time order.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, TransactionBehavior, params};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::modules::trackers::core::mutation::{UnitOfWork, apply_mutation};
use crate::modules::trackers::core::ports::{StoreError, TrackerQueries, TrackerStore};
use crate::modules::trackers::core::tracker::{Meta, Tracker};
use crate::shared::core::primitives::{Clock, SystemClock};
use crate::shared::infrastructure::database::{Database, DatabaseError};

const COLUMNS: &str = r#"id, start, "end", name, created_at, updated_at, deleted, version"#;

const DELETE_RETRY_INTERVAL: Duration = Duration::from_millis(10);

impl From<DatabaseError> for StoreError {
    fn from(error: DatabaseError) -> Self {
        match error {
            DatabaseError::Sqlite(err) => map_sqlite_error(0, err),
            DatabaseError::WorkerGone => StoreError::Backend(error.to_string()),
        }
    }
}

fn map_sqlite_error(id: u64, error: rusqlite::Error) -> StoreError {
    match &error {
        rusqlite::Error::SqliteFailure(failure, _) => match failure.code {
            rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                tracing::debug!(tracker_id = id, "write lock unavailable");
                StoreError::Locked { id }
            }
            rusqlite::ErrorCode::ConstraintViolation
                if matches!(
                    failure.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
            {
                StoreError::UniqueViolation(error.to_string())
            }
            _ => StoreError::Backend(error.to_string()),
        },
        _ => StoreError::Backend(error.to_string()),
    }
}

fn encode_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn to_i64(value: u64) -> Result<i64, StoreError> {
    i64::try_from(value)
        .map_err(|_| StoreError::Backend(format!("value {value} exceeds SQLite INTEGER range")))
}

fn parse_timestamp(row: &Row, column: &str) -> rusqlite::Result<DateTime<Utc>> {
    let raw: String = row.get(column)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            let index = row.as_ref().column_index(column).unwrap_or_default();
            rusqlite::Error::FromSqlConversionFailure(index, Type::Text, Box::new(err))
        })
}

fn row_to_tracker(row: &Row) -> rusqlite::Result<Tracker> {
    let id: i64 = row.get("id")?;
    let id = u64::try_from(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, id))?;
    let end = match row.get::<_, Option<String>>("end")? {
        Some(_) => Some(parse_timestamp(row, "end")?),
        None => None,
    };

    Ok(Tracker {
        id,
        start: parse_timestamp(row, "start")?,
        end,
        name: row.get("name")?,
        meta: Meta::hydrate(
            row.get("deleted")?,
            parse_timestamp(row, "created_at")?,
            parse_timestamp(row, "updated_at")?,
            row.get("version")?,
        ),
    })
}

/// Unit of work over an open `BEGIN IMMEDIATE` transaction.
struct SqliteUnitOfWork<'a> {
    conn: &'a Connection,
}

impl UnitOfWork for SqliteUnitOfWork<'_> {
    fn lock_version(&mut self, id: u64) -> Result<u32, StoreError> {
        // The write lock was taken when the transaction began.
        let version = self
            .conn
            .query_row(
                "SELECT version FROM time_tracker WHERE id = ?1",
                params![to_i64(id)?],
                |row| row.get::<_, u32>(0),
            )
            .optional()
            .map_err(|err| map_sqlite_error(id, err))?;
        Ok(version.unwrap_or(0))
    }

    fn insert(&mut self, desired: &Tracker, now: DateTime<Utc>) -> Result<Tracker, StoreError> {
        let sql = format!(
            r#"INSERT INTO time_tracker (start, "end", name, created_at, updated_at, deleted, version)
               VALUES (?1, ?2, ?3, ?4, ?4, 0, 1)
               RETURNING {COLUMNS}"#
        );
        self.conn
            .query_row(
                &sql,
                params![
                    encode_timestamp(desired.start),
                    desired.end.map(encode_timestamp),
                    desired.name,
                    encode_timestamp(now),
                ],
                row_to_tracker,
            )
            .map_err(|err| map_sqlite_error(desired.id, err))
    }

    fn update_where_version(
        &mut self,
        desired: &Tracker,
        current_version: u32,
        next_version: u32,
        now: DateTime<Utc>,
    ) -> Result<Option<Tracker>, StoreError> {
        let sql = format!(
            r#"UPDATE time_tracker
               SET "end" = ?1, name = ?2, updated_at = ?3, version = ?4
               WHERE id = ?5 AND version = ?6
               RETURNING {COLUMNS}"#
        );
        self.conn
            .query_row(
                &sql,
                params![
                    desired.end.map(encode_timestamp),
                    desired.name,
                    encode_timestamp(now),
                    next_version,
                    to_i64(desired.id)?,
                    current_version,
                ],
                row_to_tracker,
            )
            .optional()
            .map_err(|err| map_sqlite_error(desired.id, err))
    }
}

pub struct SqliteTrackerStore {
    db: Database,
    clock: Arc<dyn Clock>,
}

impl SqliteTrackerStore {
    pub fn new(db: Database) -> Self {
        Self::with_clock(db, Arc::new(SystemClock))
    }

    pub fn with_clock(db: Database, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }
}

#[async_trait]
impl TrackerStore for SqliteTrackerStore {
    async fn store(
        &self,
        desired: Tracker,
        expected_version: u32,
        cancel: &CancellationToken,
    ) -> Result<Tracker, StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let clock = self.clock.clone();
        let cancel = cancel.clone();

        self.db
            .execute(move |conn| {
                let id = desired.id;
                let tx = conn
                    .transaction_with_behavior(TransactionBehavior::Immediate)
                    .map_err(|err| map_sqlite_error(id, err))?;

                let mut uow = SqliteUnitOfWork { conn: &tx };
                let stored = apply_mutation(&mut uow, &desired, expected_version, clock.now())?;

                if cancel.is_cancelled() {
                    return Err(StoreError::Cancelled);
                }
                tx.commit().map_err(|err| map_sqlite_error(id, err))?;

                tracing::debug!(
                    tracker_id = stored.id,
                    version = stored.meta.version(),
                    "tracker committed"
                );
                Ok(stored)
            })
            .await
    }

    async fn delete(&self, id: u64, cancel: &CancellationToken) -> Result<(), StoreError> {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        let key = to_i64(id).map_err(|_| StoreError::NotFound { id })?;
        loop {
            let now = encode_timestamp(self.clock.now());
            let attempt_cancel = cancel.clone();
            let attempt = self
                .db
                .execute(move |conn| {
                    let tx = conn
                        .transaction_with_behavior(TransactionBehavior::Immediate)
                        .map_err(|err| map_sqlite_error(id, err))?;
                    let affected = tx
                        .execute(
                            "UPDATE time_tracker SET deleted = 1, updated_at = ?2 WHERE id = ?1",
                            params![key, now],
                        )
                        .map_err(|err| map_sqlite_error(id, err))?;
                    if affected == 0 {
                        return Err(StoreError::NotFound { id });
                    }
                    if attempt_cancel.is_cancelled() {
                        return Err(StoreError::Cancelled);
                    }
                    tx.commit().map_err(|err| map_sqlite_error(id, err))
                })
                .await;

            match attempt {
                // Deletes wait for the lock instead of failing.
                Err(StoreError::Locked { .. }) => {
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(StoreError::Cancelled),
                        _ = tokio::time::sleep(DELETE_RETRY_INTERVAL) => {}
                    }
                }
                Ok(()) => {
                    tracing::debug!(tracker_id = id, "tracker soft deleted");
                    return Ok(());
                }
                Err(other) => return Err(other),
            }
        }
    }
}

#[async_trait]
impl TrackerQueries for SqliteTrackerStore {
    async fn get_by_id(&self, id: u64) -> Result<Tracker, StoreError> {
        let key = to_i64(id).map_err(|_| StoreError::NotFound { id })?;
        self.db
            .execute(move |conn| {
                conn.query_row(
                    &format!("SELECT {COLUMNS} FROM time_tracker WHERE id = ?1 AND deleted = 0"),
                    params![key],
                    row_to_tracker,
                )
                .optional()
                .map_err(|err| map_sqlite_error(id, err))?
                .ok_or(StoreError::NotFound { id })
            })
            .await
    }

    async fn list_by_window(
        &self,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> Result<Vec<Tracker>, StoreError> {
        let start = start.map(encode_timestamp);
        let end = end.map(encode_timestamp);
        self.db
            .execute(move |conn| {
                let sql = format!(
                    "SELECT {COLUMNS} FROM time_tracker
                     WHERE deleted = 0
                       AND (?1 IS NULL OR start >= ?1)
                       AND (?2 IS NULL OR start <= ?2)
                     ORDER BY created_at, id"
                );
                let mut statement = conn.prepare(&sql).map_err(|err| map_sqlite_error(0, err))?;
                let rows = statement
                    .query_map(params![start, end], row_to_tracker)
                    .map_err(|err| map_sqlite_error(0, err))?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
                    .map_err(|err| map_sqlite_error(0, err))
            })
            .await
    }
}
