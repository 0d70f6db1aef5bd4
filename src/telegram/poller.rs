//! Long-polling loop feeding the dispatcher queue

use super::TelegramClient;
use crate::state_machine::Update;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Poll for updates until cancelled or the dispatcher goes away.
///
/// The bounded queue provides backpressure: when the dispatcher falls behind,
/// `send` waits and no further `getUpdates` call is made. Dropping the sender
/// on return closes the queue, which lets the dispatcher drain and exit.
pub async fn run_poller(
    client: TelegramClient,
    updates: mpsc::Sender<Update>,
    timeout: Duration,
    cancel: CancellationToken,
) {
    let mut offset: i64 = 0;
    let mut backoff = INITIAL_BACKOFF;

    tracing::info!(timeout_secs = timeout.as_secs(), "Update poller started");

    loop {
        let batch = tokio::select! {
            () = cancel.cancelled() => break,
            result = client.get_updates(offset, timeout) => result,
        };

        match batch {
            Ok(batch) => {
                backoff = INITIAL_BACKOFF;
                for wire in batch {
                    offset = next_offset(offset, wire.update_id);
                    let update_id = wire.update_id;
                    let Some(update) = wire.into_update() else {
                        tracing::debug!(update_id, "Skipping unsupported update");
                        continue;
                    };
                    if updates.send(update).await.is_err() {
                        tracing::info!("Dispatcher queue closed, stopping poller");
                        return;
                    }
                }
            }
            Err(e) => {
                // Rejected requests (bad token, conflicting poller) will not heal quickly
                let delay = e.retry_after.unwrap_or(if e.kind.is_retryable() {
                    backoff
                } else {
                    MAX_BACKOFF
                });
                tracing::warn!(
                    error = %e,
                    kind = ?e.kind,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "getUpdates failed, backing off"
                );
                tokio::select! {
                    () = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
                backoff = next_backoff(backoff);
            }
        }
    }

    tracing::info!("Update poller stopped");
}

/// Offset acknowledging everything up to and including `update_id`
fn next_offset(current: i64, update_id: i64) -> i64 {
    current.max(update_id.saturating_add(1))
}

fn next_backoff(current: Duration) -> Duration {
    (current * 2).min(MAX_BACKOFF)
}
