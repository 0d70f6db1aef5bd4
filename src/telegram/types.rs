//! Bot API wire types

use crate::state_machine::{InlineKeyboard, Update, UpdateKind};
use serde::{Deserialize, Serialize};

// ============================================================================
// Responses
// ============================================================================

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub parameters: Option<ResponseParameters>,
}

#[derive(Debug, Deserialize)]
pub struct ResponseParameters {
    #[serde(default)]
    pub retry_after: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUpdate {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub callback_query: Option<WireCallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireMessage {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<WireUser>,
    pub chat: WireChat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireUser {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireChat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireCallbackQuery {
    pub id: String,
    pub from: WireUser,
    #[serde(default)]
    pub message: Option<WireMessage>,
    #[serde(default)]
    pub data: Option<String>,
}

impl WireUpdate {
    /// Convert to a transport-independent update.
    ///
    /// Returns `None` for anything the bot does not handle: non-text
    /// messages, anonymous senders, callbacks without a message or payload.
    pub fn into_update(self) -> Option<Update> {
        let update_id = self.update_id;

        if let Some(message) = self.message {
            let sender_id = message.from?.id;
            let text = message.text?;
            let kind = match text.strip_prefix('/') {
                Some(body) => parse_command(message.message_id, body),
                None => UpdateKind::Text {
                    message_id: message.message_id,
                    text,
                },
            };
            return Some(Update {
                update_id,
                sender_id,
                chat_id: message.chat.id,
                kind,
            });
        }

        let query = self.callback_query?;
        let message = query.message?;
        Some(Update {
            update_id,
            sender_id: query.from.id,
            chat_id: message.chat.id,
            kind: UpdateKind::Callback {
                callback_id: query.id,
                message_id: message.message_id,
                data: query.data?,
            },
        })
    }
}

/// `name[@bot] args` with the leading slash already removed
fn parse_command(message_id: i64, body: &str) -> UpdateKind {
    let (name, args) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
    let name = name.split('@').next().unwrap_or_default();
    UpdateKind::Command {
        message_id,
        name: name.to_string(),
        args: args.trim().to_string(),
    }
}

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<WireKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
pub struct EditMessageTextRequest<'a> {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<WireKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
pub struct AnswerCallbackQueryRequest<'a> {
    pub callback_query_id: &'a str,
}

#[derive(Debug, Serialize)]
pub struct WireKeyboard<'a> {
    pub inline_keyboard: Vec<Vec<WireButton<'a>>>,
}

#[derive(Debug, Serialize)]
pub struct WireButton<'a> {
    pub text: &'a str,
    pub callback_data: &'a str,
}

impl<'a> From<&'a InlineKeyboard> for WireKeyboard<'a> {
    fn from(keyboard: &'a InlineKeyboard) -> Self {
        Self {
            inline_keyboard: keyboard
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|b| WireButton {
                            text: &b.text,
                            callback_data: &b.callback_data,
                        })
                        .collect()
                })
                .collect(),
        }
    }
}
