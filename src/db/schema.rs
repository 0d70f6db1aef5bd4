//! Database schema and types

pub use crate::state_machine::state::UserState;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// SQL schema for initialization
///
/// Index tables key rows by 8-byte big-endian ids so that `ORDER BY id`
/// yields allocation order.
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS idempotence (
    key TEXT PRIMARY KEY
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS sequences (
    name TEXT PRIMARY KEY,
    value INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS transactions_by_id (
    id BLOB PRIMARY KEY,
    body TEXT NOT NULL
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS transactions_by_date (
    day TEXT NOT NULL,
    id BLOB NOT NULL,
    body TEXT NOT NULL,
    PRIMARY KEY (day, id)
) WITHOUT ROWID;

CREATE TABLE IF NOT EXISTS user_state (
    operator_id BLOB PRIMARY KEY,
    body TEXT NOT NULL
) WITHOUT ROWID;
";

/// Name of the ledger's id counter in `sequences`
pub const TRANSACTION_SEQUENCE: &str = "transactions";

/// Storage format of a day bucket key
const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// A recorded transfer between two accounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Assigned by the ledger on creation; zero until then
    pub id: u64,
    pub date: DateTime<Utc>,
    pub from_account: String,
    pub to_account: String,
    pub amount: f64,
    pub description: String,
}

impl Transaction {
    /// A transaction that has not been stored yet
    pub fn new(
        date: DateTime<Utc>,
        from_account: impl Into<String>,
        to_account: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            date,
            from_account: from_account.into(),
            to_account: to_account.into(),
            amount,
            description: description.into(),
        }
    }

    /// Calendar day (UTC) the transaction is bucketed under
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Key of the day bucket holding transactions for `day`
pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_transaction_json_field_names() {
        let date = Utc.with_ymd_and_hms(2024, 3, 9, 12, 30, 0).unwrap();
        let mut t = Transaction::new(date, "cash", "card", -12.5, "");
        t.id = 7;

        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["from_account"], "cash");
        assert_eq!(json["to_account"], "card");
        assert_eq!(json["amount"], -12.5);
        assert_eq!(json["description"], "");

        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_day_key_is_iso_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 23, 59, 59).unwrap();
        let t = Transaction::new(date, "a", "b", 1.0, "x");
        assert_eq!(day_key(t.day()), "2024-01-05");
    }
}
