//! Conversation state types

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A node of the conversation graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeName {
    Start,
    CreateTransaction,
    ListTransactions,
    ShowTransaction,
}

impl NodeName {
    pub const ALL: [NodeName; 4] = [
        NodeName::Start,
        NodeName::CreateTransaction,
        NodeName::ListTransactions,
        NodeName::ShowTransaction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            NodeName::Start => "start",
            NodeName::CreateTransaction => "createTransaction",
            NodeName::ListTransactions => "listTransactions",
            NodeName::ShowTransaction => "showTransaction",
        }
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeName::ALL
            .into_iter()
            .find(|node| node.as_str() == s)
            .ok_or_else(|| format!("unknown state: {s}"))
    }
}

/// Persisted conversation state of the operator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserState {
    /// Current node; `None` until the first transition
    #[serde(default, deserialize_with = "lenient_node_name")]
    pub name: Option<NodeName>,

    /// Free-text payload of the in-progress input
    #[serde(default)]
    pub raw: String,

    #[serde(rename = "chatID", default)]
    pub chat_id: i64,

    /// Message to edit in place; only set when the turn came from a button press
    #[serde(rename = "messageID", default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,

    /// Day being browsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Transaction being viewed
    #[serde(rename = "transactionID", default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<u64>,
}

impl UserState {
    /// Current node, with an uninitialized state treated as `start`
    pub fn node(&self) -> NodeName {
        self.name.unwrap_or(NodeName::Start)
    }

    /// Drop the fields a previous turn's parser filled in
    pub fn clear_pending(&mut self) {
        self.raw.clear();
        self.date = None;
        self.transaction_id = None;
    }
}

/// Empty or unrecognised names load as uninitialized rather than failing the
/// whole record.
fn lenient_node_name<'de, D>(deserializer: D) -> Result<Option<NodeName>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|name| name.parse().ok()))
}
