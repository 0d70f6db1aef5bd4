//! Delivery-identifier record

use super::{Database, DbResult};
use rusqlite::params;

impl Database {
    /// Record `key` as processed.
    ///
    /// Returns `true` only for the first call with a given key; the check and
    /// the insert are a single statement, so concurrent callers cannot both
    /// see `true`. Keys are never removed.
    pub fn mark_seen(&self, key: &str) -> DbResult<bool> {
        let conn = self.lock();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO idempotence (key) VALUES (?1)",
            params![key],
        )?;
        Ok(inserted == 1)
    }
}
