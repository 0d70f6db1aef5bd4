//! Per-operator conversation state

use super::{itob, Database, DbResult, UserState};
use rusqlite::{params, OptionalExtension};

impl Database {
    /// Load the state stored for `operator_id`.
    ///
    /// A missing record is the normal first-contact case and yields
    /// `UserState::default()`.
    pub fn get_user_state(&self, operator_id: i64) -> DbResult<UserState> {
        let conn = self.lock();
        let key = operator_key(operator_id);
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM user_state WHERE operator_id = ?1",
                params![&key[..]],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(UserState::default()),
        }
    }

    /// Overwrite the state stored for `operator_id` (last write wins)
    pub fn save_user_state(&self, operator_id: i64, state: &UserState) -> DbResult<()> {
        let conn = self.lock();
        let key = operator_key(operator_id);
        let body = serde_json::to_string(state)?;

        conn.execute(
            "INSERT INTO user_state (operator_id, body) VALUES (?1, ?2)
             ON CONFLICT(operator_id) DO UPDATE SET body = excluded.body",
            params![&key[..], body],
        )?;
        Ok(())
    }
}

#[allow(clippy::cast_sign_loss)] // bit pattern only, used as a key
fn operator_key(operator_id: i64) -> [u8; 8] {
    itob(operator_id as u64)
}
