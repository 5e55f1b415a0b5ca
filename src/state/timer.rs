//! Timestamp-only countdown representation and its pure transition arithmetic.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationError;

use crate::{
    dao::models::TimerEntity,
    dto::validation::validate_timer_id,
    state::clock::EpochMillis,
};

/// Opaque identifier partitioning timers, subscriptions and tick tasks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TimerId(String);

impl TimerId {
    /// Validate and wrap a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        validate_timer_id(&raw)?;
        Ok(Self(raw))
    }

    /// Identifier text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a countdown is currently advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Counting down.
    Running,
    /// Frozen.
    Paused,
}

/// One countdown's state, expressed only through the instants it was started and paused at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerRecord {
    /// Counting down; elapsed time is measured from `start` to now.
    Running {
        /// Instant elapsed time is measured from.
        start: EpochMillis,
    },
    /// Frozen; elapsed time is measured from `start` to `paused_at`.
    Paused {
        /// Instant elapsed time is measured from.
        start: EpochMillis,
        /// Instant the countdown froze.
        paused_at: EpochMillis,
    },
}

/// Reasons a start or stop command is declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionRejected {
    /// Start while running.
    #[error("timer is already running")]
    AlreadyRunning,
    /// Stop while paused.
    #[error("timer is already paused")]
    AlreadyPaused,
    /// Stop with no record.
    #[error("timer has not been started")]
    NotStarted,
}

impl TimerRecord {
    /// A full-duration countdown paused at `now`.
    pub fn fresh(now: EpochMillis) -> Self {
        Self::Paused {
            start: now,
            paused_at: now,
        }
    }

    /// State implied by the variant.
    pub fn run_state(&self) -> RunState {
        match self {
            Self::Running { .. } => RunState::Running,
            Self::Paused { .. } => RunState::Paused,
        }
    }

    /// Instant elapsed time is measured from.
    pub fn start_epoch(&self) -> EpochMillis {
        match *self {
            Self::Running { start } | Self::Paused { start, .. } => start,
        }
    }

    /// Instant the countdown froze, if paused.
    pub fn paused_at(&self) -> Option<EpochMillis> {
        match *self {
            Self::Running { .. } => None,
            Self::Paused { paused_at, .. } => Some(paused_at),
        }
    }

    /// Milliseconds counted so far, never negative.
    pub fn elapsed_ms(&self, now: EpochMillis) -> u64 {
        let (start, reference) = match *self {
            Self::Running { start } => (start, now),
            Self::Paused { start, paused_at } => (start, paused_at),
        };
        u64::try_from(reference.saturating_sub(start)).unwrap_or(0)
    }

    /// Time left on a countdown of `duration`, clamped to `[0, duration]`.
    pub fn remaining(&self, duration: Duration, now: EpochMillis) -> Duration {
        duration.saturating_sub(Duration::from_millis(self.elapsed_ms(now)))
    }

    /// Resume counting at `now`, shifting `start` so the time already counted is preserved.
    pub fn start(self, now: EpochMillis) -> Result<Self, TransitionRejected> {
        match self {
            Self::Running { .. } => Err(TransitionRejected::AlreadyRunning),
            Self::Paused { start, paused_at } => Ok(Self::Running {
                start: now.saturating_add(start.saturating_sub(paused_at)),
            }),
        }
    }

    /// Freeze the countdown at `now`.
    pub fn stop(self, now: EpochMillis) -> Result<Self, TransitionRejected> {
        match self {
            Self::Running { start } => Ok(Self::Paused {
                start,
                paused_at: now,
            }),
            Self::Paused { .. } => Err(TransitionRejected::AlreadyPaused),
        }
    }
}

impl From<TimerEntity> for TimerRecord {
    fn from(entity: TimerEntity) -> Self {
        match entity.paused {
            Some(paused_at) => Self::Paused {
                start: entity.from,
                paused_at,
            },
            None => Self::Running { start: entity.from },
        }
    }
}

impl From<TimerRecord> for TimerEntity {
    fn from(record: TimerRecord) -> Self {
        Self {
            from: record.start_epoch(),
            paused: record.paused_at(),
        }
    }
}

/// Render a remaining duration as `M:SS`, flooring partial seconds.
pub fn format_display(remaining: Duration) -> String {
    let total = remaining.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// Observable view of a timer at one instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerStatus {
    /// Record the view was computed from.
    pub record: TimerRecord,
    /// Time left, clamped to the countdown length.
    pub remaining: Duration,
    /// `remaining` as `M:SS`.
    pub display: String,
}

impl TimerStatus {
    /// Evaluate `record` at `now`.
    pub fn at(record: TimerRecord, duration: Duration, now: EpochMillis) -> Self {
        let remaining = record.remaining(duration, now);
        Self {
            record,
            remaining,
            display: format_display(remaining),
        }
    }

    /// State of the underlying record.
    pub fn run_state(&self) -> RunState {
        self.record.run_state()
    }

    /// True once the display reads `0:00`.
    pub fn is_finished(&self) -> bool {
        self.remaining.as_secs() == 0
    }
}
