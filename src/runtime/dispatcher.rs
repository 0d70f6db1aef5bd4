//! Update dispatcher
//!
//! Single consumer of the update queue. Each update is processed to
//! completion before the next one is taken, so replies go out in the order
//! updates arrived and the operator's state is never read and written
//! concurrently.

use super::traits::{ChatTransport, Storage};
use crate::state_machine::{OutboundMessage, StateError, StateGraph, Update};
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

/// What became of one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Sender is not the operator; dropped without a trace
    Unauthorized,
    /// Delivery identifier seen before
    Duplicate,
    /// Idempotence record could not be checked; dropped
    GuardFailed,
    /// No edge matches the update; dropped
    Ignored,
    /// Turn failed with an error shown to the operator; state unchanged
    Rejected,
    /// Turn committed, reply delivered
    Delivered,
    /// Turn committed but the reply could not be delivered
    DeliveryFailed,
}

/// Drives the conversation graph from the update stream
pub struct UpdateDispatcher<S, T>
where
    S: Storage + 'static,
    T: ChatTransport + 'static,
{
    operator_id: i64,
    graph: StateGraph,
    storage: S,
    transport: T,
    clock: fn() -> DateTime<Utc>,
}

impl<S, T> UpdateDispatcher<S, T>
where
    S: Storage + 'static,
    T: ChatTransport + 'static,
{
    pub fn new(operator_id: i64, graph: StateGraph, storage: S, transport: T) -> Self {
        Self {
            operator_id,
            graph,
            storage,
            transport,
            clock: Utc::now,
        }
    }

    /// Override the time source used for "today" and creation timestamps
    #[allow(dead_code)] // Used in tests
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Process updates until the queue is closed
    pub async fn run(self, mut updates: mpsc::Receiver<Update>) {
        tracing::info!(operator_id = self.operator_id, "Dispatcher started");

        while let Some(update) = updates.recv().await {
            let outcome = self.handle_update(&update).await;
            tracing::debug!(update_id = update.update_id, ?outcome, "Update handled");
        }

        tracing::info!("Update queue closed, dispatcher stopped");
    }

    pub async fn handle_update(&self, update: &Update) -> Outcome {
        if update.sender_id != self.operator_id {
            tracing::debug!(
                update_id = update.update_id,
                sender_id = update.sender_id,
                "Dropping update from unknown sender"
            );
            return Outcome::Unauthorized;
        }

        match self.storage.mark_seen(&update.idempotence_key()) {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(update_id = update.update_id, "Dropping redelivered update");
                return Outcome::Duplicate;
            }
            Err(e) => {
                tracing::error!(update_id = update.update_id, error = %e, "Idempotence check failed");
                return Outcome::GuardFailed;
            }
        }

        let outcome = self.process(update).await;

        if let Some(callback_id) = update.callback_id() {
            if let Err(e) = self.transport.acknowledge_callback(callback_id).await {
                tracing::warn!(update_id = update.update_id, error = %e, "Failed to acknowledge callback");
            }
        }

        outcome
    }

    /// Load, advance, render, save, deliver.
    ///
    /// State is saved only after the reply rendered, so a failing renderer
    /// leaves the operator at the node they were at.
    async fn process(&self, update: &Update) -> Outcome {
        let now = (self.clock)();

        let mut state = match self.storage.load(update.sender_id) {
            Ok(state) => state,
            Err(e) => {
                tracing::error!(update_id = update.update_id, error = %e, "Failed to load user state");
                self.report(update.chat_id, &e.into()).await;
                return Outcome::Rejected;
            }
        };
        state.name = Some(state.node());
        state.chat_id = update.chat_id;
        state.message_id = update.callback_message_id();

        let next = match self.graph.advance(&state, update, now) {
            Ok(next) => next,
            Err(e) if e.is_silent() => {
                tracing::debug!(
                    update_id = update.update_id,
                    state = %state.node(),
                    "No transition for update"
                );
                return Outcome::Ignored;
            }
            Err(e) => {
                tracing::warn!(update_id = update.update_id, state = %state.node(), error = %e, "Transition rejected");
                self.report(update.chat_id, &e).await;
                return Outcome::Rejected;
            }
        };

        let reply = match self.graph.render(&next, &self.storage, now) {
            Ok(reply) => reply,
            Err(e) => {
                tracing::warn!(update_id = update.update_id, state = %next.node(), error = %e, "Render failed");
                self.report(update.chat_id, &e).await;
                return Outcome::Rejected;
            }
        };

        if let Err(e) = self.storage.save(update.sender_id, &next) {
            tracing::error!(update_id = update.update_id, error = %e, "Failed to save user state");
            self.report(update.chat_id, &e.into()).await;
            return Outcome::Rejected;
        }

        tracing::info!(
            update_id = update.update_id,
            from = %state.node(),
            to = %next.node(),
            "State transition"
        );

        match self.transport.deliver(&reply).await {
            Ok(()) => Outcome::Delivered,
            Err(e) => {
                tracing::error!(update_id = update.update_id, error = %e, "Failed to deliver reply");
                Outcome::DeliveryFailed
            }
        }
    }

    /// Send an error back to the chat; delivery failures are only logged
    async fn report(&self, chat_id: i64, err: &StateError) {
        let notice = OutboundMessage::notice(chat_id, err.user_message());
        if let Err(e) = self.transport.deliver(&notice).await {
            tracing::error!(chat_id, error = %e, "Failed to deliver error report");
        }
    }
}
