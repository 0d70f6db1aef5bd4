//! Argument parsers attached to graph edges
//!
//! Each parser receives the state with pending fields already cleared and
//! fills in the field its destination node renders from.

use super::{StateError, UserState};
use chrono::{DateTime, NaiveDate, Utc};

/// Day format used in commands, callbacks and replies
pub const DAY_FORMAT: &str = "%d.%m.%Y";

pub type ArgsParser = fn(UserState, &str, DateTime<Utc>) -> Result<UserState, StateError>;

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Keep the argument string verbatim for the renderer to interpret
#[allow(clippy::unnecessary_wraps)] // must match ArgsParser
pub fn raw(mut state: UserState, args: &str, _now: DateTime<Utc>) -> Result<UserState, StateError> {
    state.raw = args.trim().to_string();
    Ok(state)
}

/// `DD.MM.YYYY`, or today (UTC) when empty
pub fn date(mut state: UserState, args: &str, now: DateTime<Utc>) -> Result<UserState, StateError> {
    let args = args.trim();
    let day = if args.is_empty() {
        now.date_naive()
    } else {
        if !is_day_shaped(args) {
            return Err(StateError::validation(format!(
                "Invalid date {args}, expected DD.MM.YYYY"
            )));
        }
        NaiveDate::parse_from_str(args, DAY_FORMAT).map_err(|e| {
            StateError::validation(format!("Invalid date {args}: {e}, expected DD.MM.YYYY"))
        })?
    };
    state.date = Some(day);
    Ok(state)
}

/// Exactly two digits, dot, two digits, dot, four digits
fn is_day_shaped(args: &str) -> bool {
    let bytes = args.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            2 | 5 => *b == b'.',
            _ => b.is_ascii_digit(),
        })
}

pub fn transaction_id(
    mut state: UserState,
    args: &str,
    _now: DateTime<Utc>,
) -> Result<UserState, StateError> {
    let args = args.trim();
    let id = args
        .parse::<u64>()
        .map_err(|e| StateError::validation(format!("Invalid transaction id {args}: {e}")))?;
    state.transaction_id = Some(id);
    Ok(state)
}
