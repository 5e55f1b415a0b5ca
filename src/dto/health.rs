use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Timer records currently held by the clock store.
    pub stored_timers: usize,
    /// Timers with an active tick task.
    pub ticking_timers: usize,
    /// Connected observers (WebSocket and SSE).
    pub observers: usize,
    /// Timers with at least one subscribed observer.
    pub subscribed_timers: usize,
}

/// Counters reported alongside the health status.
#[derive(Debug, Default, Clone, Copy)]
pub struct HealthCounters {
    /// Entries in the clock store.
    pub stored_timers: usize,
    /// Active tick tasks.
    pub ticking_timers: usize,
    /// Connected observers.
    pub observers: usize,
    /// Timer groups with members.
    pub subscribed_timers: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(counters: HealthCounters) -> Self {
        Self::with_status("ok", counters)
    }

    /// Create a health response indicating the clock store is not answering.
    pub fn degraded(counters: HealthCounters) -> Self {
        Self::with_status("degraded", counters)
    }

    fn with_status(status: &str, counters: HealthCounters) -> Self {
        Self {
            status: status.to_string(),
            stored_timers: counters.stored_timers,
            ticking_timers: counters.ticking_timers,
            observers: counters.observers,
            subscribed_timers: counters.subscribed_timers,
        }
    }
}
