//! Core conversation state machine
//!
//! A fixed graph of named nodes. Inbound updates select an edge out of the
//! operator's current node, the edge's parser fills the pending fields, and
//! the destination node's renderer builds the reply.

mod error;
pub mod event;
mod parsers;
mod render;
pub mod reply;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use error::StateError;
pub use event::{Update, UpdateKind};
pub use reply::{InlineKeyboard, OutboundMessage};
pub use state::{NodeName, UserState};
pub use transition::StateGraph;
