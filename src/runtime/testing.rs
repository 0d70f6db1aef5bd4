//! Mock implementations for testing
//!
//! These mocks enable dispatcher testing without a real chat transport.

use super::traits::*;
use crate::db::{DbError, DbResult, Transaction};
use crate::state_machine::{OutboundMessage, UserState};
use crate::telegram::TransportError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Fixed "now" for deterministic tests: 15.06.2024 10:00 UTC
pub fn test_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 10, 0, 0).unwrap()
}

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport that records everything it is asked to deliver
#[allow(dead_code)]
pub struct MockTransport {
    delivered: Mutex<Vec<OutboundMessage>>,
    acknowledged: Mutex<Vec<String>>,
    fail: AtomicBool,
}

#[allow(dead_code)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            delivered: Mutex::new(Vec::new()),
            acknowledged: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// Make every subsequent delivery fail (or succeed again)
    pub fn fail_deliveries(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Messages delivered successfully, in order
    pub fn delivered(&self) -> Vec<OutboundMessage> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn last_text(&self) -> Option<String> {
        self.delivered
            .lock()
            .unwrap()
            .last()
            .map(|m| m.text().to_string())
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(TransportError::network("mock transport offline"));
        }
        self.delivered.lock().unwrap().push(message.clone());
        Ok(())
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        self.acknowledged
            .lock()
            .unwrap()
            .push(callback_id.to_string());
        Ok(())
    }
}

// ============================================================================
// Failing Storage
// ============================================================================

/// Storage whose every operation fails
pub struct FailingStorage;

fn storage_down() -> DbError {
    DbError::Sqlite(rusqlite::Error::InvalidQuery)
}

impl IdempotenceGuard for FailingStorage {
    fn mark_seen(&self, _key: &str) -> DbResult<bool> {
        Err(storage_down())
    }
}

impl TransactionLedger for FailingStorage {
    fn create(&self, _transaction: &Transaction) -> DbResult<u64> {
        Err(storage_down())
    }

    fn get_by_id(&self, _id: u64) -> DbResult<Transaction> {
        Err(storage_down())
    }

    fn get_by_date(&self, _day: NaiveDate) -> DbResult<Vec<Transaction>> {
        Err(storage_down())
    }
}

impl UserStateStore for FailingStorage {
    fn load(&self, _operator_id: i64) -> DbResult<UserState> {
        Err(storage_down())
    }

    fn save(&self, _operator_id: i64, _state: &UserState) -> DbResult<()> {
        Err(storage_down())
    }
}

// ============================================================================
// Read-only Storage
// ============================================================================

/// Real storage whose state saves fail
pub struct ReadOnlyStateStorage(pub DatabaseStorage);

impl IdempotenceGuard for ReadOnlyStateStorage {
    fn mark_seen(&self, key: &str) -> DbResult<bool> {
        self.0.mark_seen(key)
    }
}

impl TransactionLedger for ReadOnlyStateStorage {
    fn create(&self, transaction: &Transaction) -> DbResult<u64> {
        self.0.create(transaction)
    }

    fn get_by_id(&self, id: u64) -> DbResult<Transaction> {
        self.0.get_by_id(id)
    }

    fn get_by_date(&self, day: NaiveDate) -> DbResult<Vec<Transaction>> {
        self.0.get_by_date(day)
    }
}

impl UserStateStore for ReadOnlyStateStorage {
    fn load(&self, operator_id: i64) -> DbResult<UserState> {
        self.0.load(operator_id)
    }

    fn save(&self, _operator_id: i64, _state: &UserState) -> DbResult<()> {
        Err(storage_down())
    }
}
