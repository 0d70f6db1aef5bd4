//! Enigma - single-operator bookkeeping bot
//!
//! Long-polls the Telegram Bot API and drives a small conversation graph
//! for recording transactions and browsing them by day.

mod config;
mod db;
mod runtime;
mod state_machine;
mod telegram;

use config::Config;
use db::Database;
use runtime::{DatabaseStorage, ProductionDispatcher};
use state_machine::StateGraph;
use telegram::TelegramClient;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enigma=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = Config::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let client = TelegramClient::new(&config.api_url, &config.bot_token, config.poll_timeout)?;

    let (tx, rx) = mpsc::channel(config.queue_capacity);
    let cancel = CancellationToken::new();

    let poller = tokio::spawn(telegram::run_poller(
        client.clone(),
        tx,
        config.poll_timeout,
        cancel.clone(),
    ));

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            cancel.cancel();
        }
    });

    let dispatcher = ProductionDispatcher::new(
        config.operator_id,
        StateGraph::build(),
        DatabaseStorage::new(db),
        client,
    );

    // Returns once the poller stops and the queue is drained
    dispatcher.run(rx).await;
    poller.await?;

    tracing::info!("Enigma stopped");
    Ok(())
}
