use serde::{Deserialize, Serialize};

use crate::state::clock::EpochMillis;

/// Persisted shape of a timer record.
///
/// `paused` is present exactly while the timer is paused; its absence means the
/// countdown is running from `from`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerEntity {
    /// Instant (epoch milliseconds) elapsed time is measured from.
    pub from: EpochMillis,
    /// Instant (epoch milliseconds) the countdown was paused at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<EpochMillis>,
}
