use tracing::warn;

use crate::{
    dao::storage::with_deadline,
    dto::health::{HealthCounters, HealthResponse},
    state::SharedState,
};

/// Report store reachability together with fan-out counters.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let store = state.engine().store();
    let probe = with_deadline(
        "health_check",
        state.config().store_timeout,
        store.health_check(),
    )
    .await;

    let counters = HealthCounters {
        stored_timers: store.len(),
        ticking_timers: state.ticker().len(),
        observers: state.dispatcher().observer_count(),
        subscribed_timers: state.dispatcher().registry().group_count(),
    };

    match probe {
        Ok(()) => HealthResponse::ok(counters),
        Err(err) => {
            warn!(error = %err, "clock store health check failed");
            HealthResponse::degraded(counters)
        }
    }
}
