//! Database module for the enigma bot
//!
//! Provides persistence for the idempotence record, the transaction ledger
//! and per-operator conversation state. All three live in one SQLite file,
//! each in its own tables.

mod idempotence;
mod ledger;
mod schema;
mod user_state;

pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Corrupt record: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(u64),
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Every statement runs under this lock; a poisoned lock still holds a
    /// consistent connection because SQLite rolls back unfinished transactions.
    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 8-byte big-endian key, so that byte order matches numeric order
pub(crate) fn itob(v: u64) -> [u8; 8] {
    v.to_be_bytes()
}
