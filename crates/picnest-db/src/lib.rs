//! Constraint-checked SQLite store for the picnest social graph.

pub mod clock;
pub mod erd;
pub mod error;
pub mod migrations;
pub mod models;
pub mod password;
pub mod queries;
pub mod relations;
pub mod schema;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use tracing::info;

pub use clock::{Clock, ManualClock, SystemClock, story_expiry};
pub use error::{ErrorKind, Result, StoreError};
pub use models::{Entity, RowId};
pub use queries::{DeletePolicy, Insert, Patch};
pub use relations::{Listing, Relation};
pub use schema::Schema;
pub use validate::parse_patch;

/// Connection settings for [`Database::open`].
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub path: PathBuf,
    /// Read-only connections serving `get`/`list_by`.
    pub readers: usize,
    /// Upper bound on waiting for a SQLite lock.
    pub busy_timeout: Duration,
}

impl StoreConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            readers: 4,
            busy_timeout: Duration::from_millis(5000),
        }
    }
}

/// Single writer plus a round-robin pool of readers. Every write is one
/// `IMMEDIATE` transaction on the writer, so its checks and its insert
/// commit together.
pub struct Database {
    writer: Mutex<Connection>,
    readers: Vec<Mutex<Connection>>,
    reader_idx: AtomicUsize,
    schema: Arc<Schema>,
    clock: Arc<dyn Clock>,
}

/// What a write sees: the registry and the moment the write started.
pub struct WriteCtx<'a> {
    pub schema: &'a Schema,
    pub now: DateTime<Utc>,
}

impl Database {
    pub fn open(config: &StoreConfig, schema: Arc<Schema>) -> Result<Self> {
        let mut writer = Connection::open(&config.path)?;

        // WAL mode for concurrent reads
        writer.pragma_update(None, "journal_mode", "WAL")?;
        writer.pragma_update(None, "foreign_keys", "ON")?;
        writer.busy_timeout(config.busy_timeout)?;

        migrations::run(&mut writer, &schema)?;

        let mut readers = Vec::with_capacity(config.readers);
        for _ in 0..config.readers {
            readers.push(Mutex::new(open_reader(&config.path, config.busy_timeout)?));
        }

        info!(
            "Database opened at {} (1 writer + {} readers)",
            config.path.display(),
            readers.len()
        );
        Ok(Self {
            writer: Mutex::new(writer),
            readers,
            reader_idx: AtomicUsize::new(0),
            schema,
            clock: Arc::new(SystemClock),
        })
    }

    /// Private in-memory database. Reads share the writer connection.
    pub fn open_in_memory(schema: Arc<Schema>) -> Result<Self> {
        let mut writer = Connection::open_in_memory()?;
        writer.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&mut writer, &schema)?;

        Ok(Self {
            writer: Mutex::new(writer),
            readers: Vec::new(),
            reader_idx: AtomicUsize::new(0),
            schema,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for defaulted timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn now(&self) -> DateTime<Utc> {
        clock::normalize(self.clock.now())
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        if self.readers.is_empty() {
            let conn = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
            return f(&conn);
        }

        let idx = self.reader_idx.fetch_add(1, Ordering::Relaxed) % self.readers.len();
        let conn = self.readers[idx]
            .lock()
            .map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }

    /// Run `f` inside one write transaction. Any error rolls the whole
    /// write back.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, &WriteCtx<'_>) -> Result<T>,
    {
        let mut conn = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let ctx = WriteCtx {
            schema: &self.schema,
            now: self.now(),
        };
        let out = f(&tx, &ctx)?;
        tx.commit()?;
        Ok(out)
    }

    /// Row count of every table in the schema, in registry order.
    pub fn table_counts(&self) -> Result<Vec<(&'static str, i64)>> {
        self.with_conn(|conn| {
            let mut counts = Vec::with_capacity(self.schema.tables().len());
            for table in self.schema.tables() {
                let sql = format!("SELECT COUNT(*) FROM \"{}\"", table.name);
                let count: i64 = conn.query_row(&sql, [], |r| r.get(0))?;
                counts.push((table.name, count));
            }
            Ok(counts)
        })
    }
}

fn open_reader(path: &Path, busy_timeout: Duration) -> Result<Connection> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;
    Ok(conn)
}
