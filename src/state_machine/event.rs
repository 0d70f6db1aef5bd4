//! Inbound updates, independent of the chat transport

/// One inbound event from the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    pub update_id: i64,
    pub sender_id: i64,
    pub chat_id: i64,
    pub kind: UpdateKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateKind {
    /// Plain text message
    Text { message_id: i64, text: String },
    /// `/name args` message
    Command {
        message_id: i64,
        name: String,
        args: String,
    },
    /// Button press on a message the bot sent earlier
    Callback {
        callback_id: String,
        message_id: i64,
        data: String,
    },
}

/// Which edge table an update is looked up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger<'a> {
    Text,
    Command(&'a str),
    Callback(&'a str),
}

impl Update {
    /// Delivery identifier used to drop redelivered updates
    pub fn idempotence_key(&self) -> String {
        match &self.kind {
            UpdateKind::Text { message_id, .. } | UpdateKind::Command { message_id, .. } => {
                format!("telegram:{}:{}", self.chat_id, message_id)
            }
            UpdateKind::Callback { callback_id, .. } => {
                format!("telegram:{}:cb:{}", self.chat_id, callback_id)
            }
        }
    }

    /// Message a button press belongs to, so the reply can edit it in place
    pub fn callback_message_id(&self) -> Option<i64> {
        match &self.kind {
            UpdateKind::Callback { message_id, .. } => Some(*message_id),
            _ => None,
        }
    }

    pub fn callback_id(&self) -> Option<&str> {
        match &self.kind {
            UpdateKind::Callback { callback_id, .. } => Some(callback_id),
            _ => None,
        }
    }

    /// Lookup key and argument string.
    ///
    /// Callback payloads are `token args`: the first whitespace-separated
    /// field picks the edge, the remainder is handed to its parser.
    pub fn trigger(&self) -> (Trigger<'_>, &str) {
        match &self.kind {
            UpdateKind::Text { text, .. } => (Trigger::Text, text.as_str()),
            UpdateKind::Command { name, args, .. } => (Trigger::Command(name), args.as_str()),
            UpdateKind::Callback { data, .. } => {
                let data = data.trim();
                match data.split_once(char::is_whitespace) {
                    Some((token, args)) => (Trigger::Callback(token), args.trim()),
                    None => (Trigger::Callback(data), ""),
                }
            }
        }
    }
}
