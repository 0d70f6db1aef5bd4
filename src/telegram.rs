//! Telegram Bot API transport
//!
//! Long-polls `getUpdates` for inbound traffic and implements
//! [`ChatTransport`] for outbound replies.

mod error;
mod poller;
mod types;

pub use error::TransportError;
pub use poller::run_poller;
pub use types::WireUpdate;

use crate::runtime::ChatTransport;
use crate::state_machine::OutboundMessage;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use types::{
    AnswerCallbackQueryRequest, ApiResponse, EditMessageTextRequest, GetUpdatesRequest,
    SendMessageRequest, WireKeyboard,
};

/// Update types the bot subscribes to
const ALLOWED_UPDATES: &[&str] = &["message", "callback_query"];

/// Slack on top of the long-poll timeout before the HTTP request gives up
const REQUEST_SLACK: Duration = Duration::from_secs(10);

/// Returned by `editMessageText` when the new content equals the old one
const NOT_MODIFIED: &str = "message is not modified";

/// Bot API client
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    /// `{api_url}/bot{token}`; never logged
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(poll_timeout + REQUEST_SLACK)
            .build()
            .map_err(|e| TransportError::network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    /// Long-poll for updates with `update_id >= offset`
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout: Duration,
    ) -> Result<Vec<WireUpdate>, TransportError> {
        let request = GetUpdatesRequest {
            offset,
            timeout: timeout.as_secs(),
            allowed_updates: ALLOWED_UPDATES,
        };
        self.call("getUpdates", &request).await
    }

    async fn call<B: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<R, TransportError> {
        let response = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {}", e.without_url())))?;

        let parsed: ApiResponse<R> = serde_json::from_str(&text).map_err(|e| {
            TransportError::decode(format!("{method}: HTTP {status}: unexpected body: {e}"))
        })?;

        if parsed.ok {
            return parsed
                .result
                .ok_or_else(|| TransportError::decode(format!("{method}: missing result")));
        }
        Err(classify_error(method, &parsed))
    }
}

fn classify_error<R>(method: &str, response: &ApiResponse<R>) -> TransportError {
    let description = response.description.as_deref().unwrap_or("no description");
    let code = response.error_code.unwrap_or_default();
    match code {
        429 => {
            let mut err = TransportError::rate_limit(format!("{method}: rate limited: {description}"));
            if let Some(secs) = response.parameters.as_ref().and_then(|p| p.retry_after) {
                err = err.with_retry_after(Duration::from_secs(secs));
            }
            err
        }
        500..=599 => TransportError::network(format!("{method}: server error {code}: {description}")),
        _ => TransportError::api(format!("{method}: error {code}: {description}")),
    }
}

#[async_trait]
impl ChatTransport for TelegramClient {
    async fn deliver(&self, message: &OutboundMessage) -> Result<(), TransportError> {
        let reply_markup = message.keyboard().map(WireKeyboard::from);
        match message {
            OutboundMessage::Send { chat_id, text, .. } => {
                let request = SendMessageRequest {
                    chat_id: *chat_id,
                    text,
                    reply_markup,
                };
                self.call::<_, serde_json::Value>("sendMessage", &request)
                    .await
                    .map(|_| ())
            }
            OutboundMessage::Edit {
                chat_id,
                message_id,
                text,
                ..
            } => {
                let request = EditMessageTextRequest {
                    chat_id: *chat_id,
                    message_id: *message_id,
                    text,
                    reply_markup,
                };
                match self.call::<_, serde_json::Value>("editMessageText", &request).await {
                    // Re-rendering an unchanged view is not a failure
                    Err(e) if e.message.contains(NOT_MODIFIED) => Ok(()),
                    other => other.map(|_| ()),
                }
            }
        }
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<(), TransportError> {
        let request = AnswerCallbackQueryRequest {
            callback_query_id: callback_id,
        };
        self.call::<_, bool>("answerCallbackQuery", &request).await.map(|_| ())
    }
}
