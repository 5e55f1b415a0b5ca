use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    dto::format_epoch_ms,
    state::timer::{RunState, TimerId, TimerStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
/// Push event delivered to every observer of a timer.
pub struct TimerUpdate {
    /// Timer identifier.
    #[schema(value_type = String)]
    pub id: TimerId,
    /// Remaining time as `M:SS`.
    pub time: String,
    /// Whether the countdown is running.
    pub state: RunState,
}

impl TimerUpdate {
    /// Build an update from already formatted parts.
    pub fn new(id: TimerId, time: impl Into<String>, state: RunState) -> Self {
        Self {
            id,
            time: time.into(),
            state,
        }
    }

    /// Build an update from a computed status.
    pub fn from_status(id: TimerId, status: &TimerStatus) -> Self {
        Self::new(id, status.display.clone(), status.run_state())
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Record returned by start, stop and reset commands.
pub struct TimerRecordResponse {
    /// Timer identifier.
    #[schema(value_type = String)]
    pub id: TimerId,
    /// Epoch milliseconds elapsed time is measured from.
    pub from: i64,
    /// Epoch milliseconds the timer was paused at, absent while running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused: Option<i64>,
    /// Whether the countdown is running.
    pub state: RunState,
    /// Remaining time as `M:SS` at the moment of the command.
    pub time: String,
    /// RFC 3339 rendering of `from`.
    pub started_at: String,
    /// RFC 3339 rendering of `paused`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paused_at: Option<String>,
}

impl TimerRecordResponse {
    /// Render the record behind `status`.
    pub fn from_status(id: TimerId, status: &TimerStatus) -> Self {
        let from = status.record.start_epoch();
        let paused = status.record.paused_at();
        Self {
            id,
            from,
            paused,
            state: status.run_state(),
            time: status.display.clone(),
            started_at: format_epoch_ms(from),
            paused_at: paused.map(format_epoch_ms),
        }
    }
}
