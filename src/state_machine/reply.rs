//! Outbound replies produced by node renderers

use super::UserState;

/// Callback token of filler buttons; no edge consumes it
pub const NOOP_CALLBACK: &str = "noop";

/// Reply to be interpreted by the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundMessage {
    /// Post a new message
    Send {
        chat_id: i64,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    /// Replace the text and keyboard of an existing message
    Edit {
        chat_id: i64,
        message_id: i64,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
}

impl OutboundMessage {
    /// Reply for the turn described by `state`: edits the pressed message
    /// when there is one, sends a new message otherwise.
    pub fn for_state(
        state: &UserState,
        text: impl Into<String>,
        keyboard: Option<InlineKeyboard>,
    ) -> Self {
        match state.message_id {
            Some(message_id) => OutboundMessage::Edit {
                chat_id: state.chat_id,
                message_id,
                text: text.into(),
                keyboard,
            },
            None => OutboundMessage::Send {
                chat_id: state.chat_id,
                text: text.into(),
                keyboard,
            },
        }
    }

    /// Plain new message, used for error reports
    pub fn notice(chat_id: i64, text: impl Into<String>) -> Self {
        OutboundMessage::Send {
            chat_id,
            text: text.into(),
            keyboard: None,
        }
    }

    #[allow(dead_code)] // Used in tests
    pub fn text(&self) -> &str {
        match self {
            OutboundMessage::Send { text, .. } | OutboundMessage::Edit { text, .. } => text,
        }
    }

    pub fn keyboard(&self) -> Option<&InlineKeyboard> {
        match self {
            OutboundMessage::Send { keyboard, .. } | OutboundMessage::Edit { keyboard, .. } => {
                keyboard.as_ref()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub text: String,
    pub callback_data: String,
}

impl Button {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }

    /// Inert button used to complete a row visually
    pub fn filler() -> Self {
        Self::new(" ", NOOP_CALLBACK)
    }

    #[allow(dead_code)] // Used in tests
    pub fn is_filler(&self) -> bool {
        self.callback_data == NOOP_CALLBACK
    }
}

/// Grid of buttons attached below a message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<Button>>,
}

impl InlineKeyboard {
    /// All buttons, row by row
    #[allow(dead_code)] // Used in tests
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

/// Packs buttons into rows of a fixed width
#[derive(Debug)]
pub struct KeyboardBuilder {
    rows: Vec<Vec<Button>>,
    per_row: usize,
}

impl KeyboardBuilder {
    pub fn new(per_row: usize) -> Self {
        Self {
            rows: Vec::new(),
            per_row: per_row.max(1),
        }
    }

    /// Append a button, starting a new row when the last one is full
    pub fn button(mut self, button: Button) -> Self {
        match self.rows.last_mut() {
            Some(row) if row.len() < self.per_row => row.push(button),
            _ => self.rows.push(vec![button]),
        }
        self
    }

    /// Fill the last row up to full width with filler buttons
    pub fn pad_last_row(mut self) -> Self {
        if let Some(row) = self.rows.last_mut() {
            while row.len() < self.per_row {
                row.push(Button::filler());
            }
        }
        self
    }

    /// Append a complete row regardless of width
    pub fn row(mut self, row: Vec<Button>) -> Self {
        if !row.is_empty() {
            self.rows.push(row);
        }
        self
    }

    pub fn build(self) -> InlineKeyboard {
        InlineKeyboard { rows: self.rows }
    }
}
