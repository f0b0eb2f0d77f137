// SQLite connection owned by a dedicated worker thread.
//
// Purpose
// - Keep the blocking rusqlite connection off the async runtime.
// - Run schema migrations once, before the first caller gets a handle.
//
// Responsibilities
// - Open the connection with a zero busy timeout so lock contention fails fast.
// - Execute closures against the connection one at a time, in submission order.
// - Shut the worker down when the last handle is dropped.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex, mpsc},
    thread::{self, JoinHandle},
    time::Duration,
};

use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use thiserror::Error;
use tokio::sync::oneshot;

mod migrations;

use migrations::run_migrations;

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("database worker is gone")]
    WorkerGone,

    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct DatabaseInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for DatabaseInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                tracing::error!("failed to send shutdown to database thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                tracing::error!("failed to join database thread: {join_err:?}");
            }
        }
    }
}

#[derive(Clone)]
pub struct Database {
    inner: Arc<DatabaseInner>,
}

impl Database {
    /// Opens (or creates) the database file and migrates it.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let path_for_thread = path.clone();
        let inner = Self::spawn(move || Connection::open(&path_for_thread))?;
        tracing::info!(path = %path.display(), "database initialized");

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Private in memory database, gone when the last handle is dropped.
    pub fn open_in_memory() -> Result<Self> {
        let inner = Self::spawn(Connection::open_in_memory)?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    fn spawn<O>(open: O) -> Result<DatabaseInner>
    where
        O: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("trackers-db".into())
            .spawn(move || {
                let mut conn = match open() {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(
                            anyhow::Error::new(err).context("failed to open SQLite database")
                        ));
                        return;
                    }
                };

                if let Err(err) = conn.busy_timeout(Duration::ZERO) {
                    tracing::error!("failed to set busy timeout: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    tracing::error!("failed to enable WAL mode: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    tracing::error!("database initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                tracing::debug!("database thread shutting down");
            })
            .context("failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("database worker exited before signaling readiness"))??;

        Ok(DatabaseInner {
            sender: command_tx,
            worker: Mutex::new(Some(worker)),
        })
    }

    /// Runs `task` on the worker thread and hands its result back.
    pub async fn execute<F, T, E>(&self, task: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DatabaseError> + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                tracing::debug!("database caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|_| E::from(DatabaseError::WorkerGone))?;

        reply_rx
            .await
            .map_err(|_| E::from(DatabaseError::WorkerGone))?
    }
}
