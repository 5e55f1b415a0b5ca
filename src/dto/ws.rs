use serde::{Deserialize, Serialize};

use crate::{dto::timer::TimerUpdate, state::timer::TimerId};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
/// Timer identifier as sent by clients, which may use bare numbers.
pub enum TimerIdInput {
    /// Bare JSON number, used as its decimal text.
    Number(u64),
    /// JSON string.
    Text(String),
}

impl TimerIdInput {
    /// Identifier text before validation.
    pub fn into_raw(self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
/// Messages accepted from observer WebSocket clients.
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ObserverInboundMessage {
    /// Join the timer's group and receive its current state.
    Subscribe(TimerIdInput),
    /// Leave the timer's group.
    Unsubscribe(TimerIdInput),
}

impl ObserverInboundMessage {
    /// Parse a text frame.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Frames pushed to observer WebSocket clients.
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ObserverOutboundMessage {
    /// Acknowledges a subscribe request.
    Subscribed {
        /// Timer joined.
        timer_id: TimerId,
    },
    /// Acknowledges an unsubscribe request.
    Unsubscribed {
        /// Timer left.
        timer_id: TimerId,
    },
    /// Current state of a followed timer.
    TimerUpdate(TimerUpdate),
    /// A request was rejected.
    Error {
        /// Reason shown to the client.
        message: String,
    },
}
