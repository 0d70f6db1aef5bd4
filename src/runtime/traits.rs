//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the dispatcher with mock implementations.
//! Storage is synchronous (embedded SQLite); the chat transport is async.

use crate::db::{DbResult, Transaction};
use crate::state_machine::{OutboundMessage, UserState};
use crate::telegram::TransportError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Durable record of processed delivery identifiers
pub trait IdempotenceGuard: Send + Sync {
    /// `true` exactly once per identifier, across restarts
    fn mark_seen(&self, key: &str) -> DbResult<bool>;
}

/// Append-only transaction store with id and day indexes
pub trait TransactionLedger: Send + Sync {
    /// Store `transaction` under a freshly allocated id and return the id
    fn create(&self, transaction: &Transaction) -> DbResult<u64>;

    fn get_by_id(&self, id: u64) -> DbResult<Transaction>;

    /// Transactions of one calendar day in creation order
    fn get_by_date(&self, day: NaiveDate) -> DbResult<Vec<Transaction>>;
}

/// One conversation state record per operator
pub trait UserStateStore: Send + Sync {
    /// Missing state is not an error: it loads as `UserState::default()`
    fn load(&self, operator_id: i64) -> DbResult<UserState>;

    fn save(&self, operator_id: i64, state: &UserState) -> DbResult<()>;
}

/// Outbound side of the chat transport
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send or edit a message
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError>;

    /// Tell the client a button press was handled
    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), TransportError>;
}

/// Combined storage trait for convenience
pub trait Storage: IdempotenceGuard + TransactionLedger + UserStateStore {}
impl<T: IdempotenceGuard + TransactionLedger + UserStateStore> Storage for T {}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

impl<T: IdempotenceGuard + ?Sized> IdempotenceGuard for Arc<T> {
    fn mark_seen(&self, key: &str) -> DbResult<bool> {
        (**self).mark_seen(key)
    }
}

impl<T: TransactionLedger + ?Sized> TransactionLedger for Arc<T> {
    fn create(&self, transaction: &Transaction) -> DbResult<u64> {
        (**self).create(transaction)
    }

    fn get_by_id(&self, id: u64) -> DbResult<Transaction> {
        (**self).get_by_id(id)
    }

    fn get_by_date(&self, day: NaiveDate) -> DbResult<Vec<Transaction>> {
        (**self).get_by_date(day)
    }
}

impl<T: UserStateStore + ?Sized> UserStateStore for Arc<T> {
    fn load(&self, operator_id: i64) -> DbResult<UserState> {
        (**self).load(operator_id)
    }

    fn save(&self, operator_id: i64, state: &UserState) -> DbResult<()> {
        (**self).save(operator_id, state)
    }
}

#[async_trait]
impl<T: ChatTransport + ?Sized> ChatTransport for Arc<T> {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        (**self).deliver(message).await
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        (**self).acknowledge_callback(callback_id).await
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

use crate::db::Database;
use std::sync::Arc;

/// Adapter to use Database as Storage
#[derive(Clone)]
pub struct DatabaseStorage {
    db: Database,
}

impl DatabaseStorage {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

impl IdempotenceGuard for DatabaseStorage {
    fn mark_seen(&self, key: &str) -> DbResult<bool> {
        self.db.mark_seen(key)
    }
}

impl TransactionLedger for DatabaseStorage {
    fn create(&self, transaction: &Transaction) -> DbResult<u64> {
        self.db.create_transaction(transaction)
    }

    fn get_by_id(&self, id: u64) -> DbResult<Transaction> {
        self.db.get_transaction(id)
    }

    fn get_by_date(&self, day: NaiveDate) -> DbResult<Vec<Transaction>> {
        self.db.get_transactions_by_date(day)
    }
}

impl UserStateStore for DatabaseStorage {
    fn load(&self, operator_id: i64) -> DbResult<UserState> {
        self.db.get_user_state(operator_id)
    }

    fn save(&self, operator_id: i64, state: &UserState) -> DbResult<()> {
        self.db.save_user_state(operator_id, state)
    }
}
