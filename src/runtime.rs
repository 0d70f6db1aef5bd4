//! Runtime for driving the conversation
//!
//! Wires storage, the state graph and the chat transport together behind the
//! traits in [`traits`].

mod dispatcher;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use dispatcher::UpdateDispatcher;
pub use traits::*;

/// Type alias for production dispatcher with concrete implementations
pub type ProductionDispatcher = UpdateDispatcher<DatabaseStorage, crate::telegram::TelegramClient>;
