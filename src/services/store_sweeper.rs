use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{dao::storage::with_deadline, state::SharedState};

/// Periodically purge expired clock store entries until `shutdown` fires.
///
/// Lookups already ignore expired records; this keeps abandoned timers from
/// occupying store capacity.
pub async fn run(state: SharedState, every: Duration, shutdown: CancellationToken) {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let store = state.engine().store();
        match with_deadline("sweep_expired", state.config().store_timeout, store.sweep_expired()).await {
            Ok(0) => {}
            Ok(purged) => debug!(purged, remaining = store.len(), "purged expired timer records"),
            Err(err) => warn!(error = %err, "clock store sweep failed"),
        }
    }
}
