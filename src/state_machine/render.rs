//! Node renderers: the reply sent after a transition into a node

use super::parsers::format_day;
use super::reply::{Button, KeyboardBuilder, OutboundMessage};
use super::{StateError, UserState};
use crate::db::Transaction;
use crate::runtime::TransactionLedger;
use chrono::{DateTime, Days, Utc};
use std::fmt::Write;

/// Transaction buttons per keyboard row
const BUTTONS_PER_ROW: usize = 5;

const WELCOME_TEXT: &str = "Welcome! I keep track of your transfers.\n\n\
/create <from> <to> <amount> <description> - record a transfer\n\
/list [DD.MM.YYYY] - show transfers for a day (today by default)";

const CREATE_PROMPT: &str = "Send the transfer as: <from> <to> <amount> <description>";

const CREATE_FORMAT_ERROR: &str =
    "Invalid transaction format, expected: <from> <to> <amount> <description>";

/// Fields of a transaction that get an edit button
const EDITABLE_FIELDS: [(&str, &str); 5] = [
    ("date", "Date"),
    ("from", "From"),
    ("to", "To"),
    ("amount", "Amount"),
    ("description", "Description"),
];

/// I/O available to renderers
pub struct RenderContext<'a> {
    pub ledger: &'a dyn TransactionLedger,
    pub now: DateTime<Utc>,
}

pub type Renderer = fn(&UserState, &RenderContext<'_>) -> Result<OutboundMessage, StateError>;

#[allow(clippy::unnecessary_wraps)] // must match Renderer
pub fn start(state: &UserState, _ctx: &RenderContext<'_>) -> Result<OutboundMessage, StateError> {
    Ok(OutboundMessage::for_state(state, WELCOME_TEXT, None))
}

/// Record the transfer held in `state.raw`, or prompt for one when empty
pub fn create_transaction(
    state: &UserState,
    ctx: &RenderContext<'_>,
) -> Result<OutboundMessage, StateError> {
    if state.raw.trim().is_empty() {
        return Ok(OutboundMessage::for_state(state, CREATE_PROMPT, None));
    }

    let transaction = parse_transaction(&state.raw, ctx.now)?;
    let id = ctx.ledger.create(&transaction)?;
    tracing::info!(
        transaction_id = id,
        from = %transaction.from_account,
        to = %transaction.to_account,
        "Transaction created"
    );

    Ok(OutboundMessage::for_state(state, "Transaction created", None))
}

pub fn list_transactions(
    state: &UserState,
    ctx: &RenderContext<'_>,
) -> Result<OutboundMessage, StateError> {
    let day = state
        .date
        .ok_or_else(|| StateError::validation("No day selected"))?;
    let transactions = ctx.ledger.get_by_date(day)?;

    let mut text = String::new();
    let mut keyboard = KeyboardBuilder::new(BUTTONS_PER_ROW);

    if transactions.is_empty() {
        let _ = write!(text, "No transactions for {}", format_day(day));
    } else {
        let _ = write!(text, "Transactions for {}:\n\n", format_day(day));
        for (i, t) in transactions.iter().enumerate() {
            let index = i + 1;
            let _ = writeln!(
                text,
                "{index}. {} -> {} {} : {}",
                t.from_account, t.to_account, t.amount, t.description
            );
            keyboard = keyboard.button(Button::new(index.to_string(), format!("show {}", t.id)));
        }
        keyboard = keyboard.pad_last_row();
    }

    let mut navigation = Vec::with_capacity(2);
    if let Some(previous) = day.checked_sub_days(Days::new(1)) {
        navigation.push(Button::new(
            "⬅️ Previous day",
            format!("list {}", format_day(previous)),
        ));
    }
    if let Some(next) = day.checked_add_days(Days::new(1)) {
        navigation.push(Button::new(
            "Next day ➡️",
            format!("list {}", format_day(next)),
        ));
    }

    let keyboard = keyboard.row(navigation).build();
    Ok(OutboundMessage::for_state(
        state,
        text.trim_end(),
        Some(keyboard),
    ))
}

pub fn show_transaction(
    state: &UserState,
    ctx: &RenderContext<'_>,
) -> Result<OutboundMessage, StateError> {
    let id = state
        .transaction_id
        .ok_or_else(|| StateError::validation("No transaction selected"))?;
    let t = ctx.ledger.get_by_id(id)?;
    let day = format_day(t.day());

    let text = format!(
        "Transaction #{}\n\nDate: {day}\nFrom: {}\nTo: {}\nAmount: {}\nDescription: {}",
        t.id, t.from_account, t.to_account, t.amount, t.description
    );

    let keyboard = EDITABLE_FIELDS
        .iter()
        .fold(KeyboardBuilder::new(BUTTONS_PER_ROW), |kb, (field, label)| {
            kb.button(Button::new(*label, format!("edit {field} {}", t.id)))
        })
        .pad_last_row()
        .row(vec![Button::new(
            format!("⬅️ Back to {day}"),
            format!("list {day}"),
        )])
        .build();

    Ok(OutboundMessage::for_state(state, text, Some(keyboard)))
}

/// `<from> <to> <amount> <description>`, description being the remainder
fn parse_transaction(raw: &str, now: DateTime<Utc>) -> Result<Transaction, StateError> {
    let format_error = || StateError::validation(CREATE_FORMAT_ERROR);

    let (from, rest) = next_field(raw).ok_or_else(format_error)?;
    let (to, rest) = next_field(rest).ok_or_else(format_error)?;
    let (amount, description) = next_field(rest).ok_or_else(format_error)?;
    let description = description.trim();
    if description.is_empty() {
        return Err(format_error());
    }

    let amount: f64 = amount
        .parse()
        .ok()
        .filter(|a: &f64| a.is_finite())
        .ok_or_else(|| StateError::validation(format!("Invalid amount {amount}")))?;

    Ok(Transaction::new(now, from, to, amount, description))
}

/// Split off the first whitespace-separated field
fn next_field(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    Some(s.split_once(char::is_whitespace).unwrap_or((s, "")))
}
