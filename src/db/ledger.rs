//! Append-only transaction ledger
//!
//! Every transaction is stored twice: once under its id and once inside the
//! bucket of its calendar day. Both rows are written in the same SQLite
//! transaction.

use super::{day_key, itob, Database, DbError, DbResult, Transaction, TRANSACTION_SEQUENCE};
use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension};

impl Database {
    /// Store a transaction and return its newly allocated id.
    ///
    /// Any id already present on `transaction` is replaced.
    pub fn create_transaction(&self, transaction: &Transaction) -> DbResult<u64> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;

        let value: i64 = tx.query_row(
            "INSERT INTO sequences (name, value) VALUES (?1, 1)
             ON CONFLICT(name) DO UPDATE SET value = value + 1
             RETURNING value",
            params![TRANSACTION_SEQUENCE],
            |row| row.get(0),
        )?;
        #[allow(clippy::cast_sign_loss)] // counter starts at 1 and only grows
        let id = value as u64;

        let mut stored = transaction.clone();
        stored.id = id;
        let body = serde_json::to_string(&stored)?;
        let key = itob(id);

        tx.execute(
            "INSERT INTO transactions_by_id (id, body) VALUES (?1, ?2)",
            params![&key[..], body],
        )?;
        tx.execute(
            "INSERT INTO transactions_by_date (day, id, body) VALUES (?1, ?2, ?3)",
            params![day_key(stored.day()), &key[..], body],
        )?;

        tx.commit()?;
        Ok(id)
    }

    /// Get transaction by ID
    pub fn get_transaction(&self, id: u64) -> DbResult<Transaction> {
        let conn = self.lock();
        let key = itob(id);
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM transactions_by_id WHERE id = ?1",
                params![&key[..]],
                |row| row.get(0),
            )
            .optional()?;

        let body = body.ok_or(DbError::TransactionNotFound(id))?;
        Ok(serde_json::from_str(&body)?)
    }

    /// All transactions bucketed under `day`, in creation order.
    /// A day without transactions yields an empty list.
    pub fn get_transactions_by_date(&self, day: NaiveDate) -> DbResult<Vec<Transaction>> {
        let conn = self.lock();
        let mut stmt =
            conn.prepare("SELECT body FROM transactions_by_date WHERE day = ?1 ORDER BY id ASC")?;

        let bodies = stmt
            .query_map(params![day_key(day)], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(DbError::from))
            .collect()
    }
}
