//! Conversation error types

use crate::db::DbError;
use thiserror::Error;

/// Failure of a conversation turn
#[derive(Debug, Error)]
pub enum StateError {
    /// The update matches no edge out of the current node
    #[error("No transition for this input")]
    NoTransition,
    /// Malformed arguments or a missing precondition
    #[error("{0}")]
    Validation(String),
    #[error("Transaction {0} not found")]
    NotFound(u64),
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl StateError {
    pub fn validation(message: impl Into<String>) -> Self {
        StateError::Validation(message.into())
    }

    /// Stray input is dropped without telling the operator
    pub fn is_silent(&self) -> bool {
        matches!(self, StateError::NoTransition)
    }

    /// Text shown to the operator; storage internals stay in the logs
    pub fn user_message(&self) -> String {
        match self {
            StateError::Storage(_) => "Something went wrong, please try again".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<DbError> for StateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::TransactionNotFound(id) => StateError::NotFound(id),
            other => StateError::Storage(other),
        }
    }
}
