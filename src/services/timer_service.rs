use tracing::{debug, info};

use crate::{
    dto::timer::{TimerRecordResponse, TimerUpdate},
    error::ServiceError,
    state::{SharedState, subscriptions::ObserverId, timer::TimerId},
};

/// Poll the display text of a timer, creating a fresh record on first use.
pub async fn display(state: &SharedState, id: &TimerId) -> String {
    state.engine().compute_display(id).await
}

/// Current push payload for a timer without creating a record.
pub async fn current_update(state: &SharedState, id: &TimerId) -> Result<TimerUpdate, ServiceError> {
    state
        .engine()
        .state(id)
        .await
        .map(|status| TimerUpdate::from_status(id.clone(), &status))
        .ok_or_else(|| ServiceError::NotFound(format!("timer `{id}` has no record")))
}

/// Start or resume a timer, notify its observers and begin periodic pushes.
pub async fn start(state: &SharedState, id: &TimerId) -> Result<TimerRecordResponse, ServiceError> {
    let status = state.engine().start(id).await?;
    state
        .dispatcher()
        .broadcast(id, &status.display, status.run_state());
    state.ticker().ensure_ticking(id);
    info!(timer_id = %id, time = %status.display, "timer started");
    Ok(TimerRecordResponse::from_status(id.clone(), &status))
}

/// Pause a running timer, halting its periodic pushes before notifying observers.
pub async fn stop(state: &SharedState, id: &TimerId) -> Result<TimerRecordResponse, ServiceError> {
    let status = state.engine().stop(id).await?;
    state.ticker().cancel(id);
    state
        .dispatcher()
        .broadcast(id, &status.display, status.run_state());
    info!(timer_id = %id, time = %status.display, "timer stopped");
    Ok(TimerRecordResponse::from_status(id.clone(), &status))
}

/// Put a timer back to its full duration, paused.
pub async fn reset(state: &SharedState, id: &TimerId) -> TimerRecordResponse {
    let status = state.engine().reset(id).await;
    state.ticker().cancel(id);
    state
        .dispatcher()
        .broadcast(id, &status.display, status.run_state());
    info!(timer_id = %id, "timer reset");
    TimerRecordResponse::from_status(id.clone(), &status)
}

/// Add `observer` to the timer's group and hand it the current state, if any.
pub async fn subscribe(state: &SharedState, observer: ObserverId, id: &TimerId) {
    let newly_joined = state.dispatcher().registry().join(id, observer);
    debug!(observer = %observer, timer_id = %id, newly_joined, "observer subscribed");

    if let Some(status) = state.engine().state(id).await {
        state
            .dispatcher()
            .notify_one(observer, id, &status.display, status.run_state());
    }
}

/// Remove `observer` from the timer's group; leaving a group it never joined is fine.
pub fn unsubscribe(state: &SharedState, observer: ObserverId, id: &TimerId) {
    let was_member = state.dispatcher().registry().leave(id, observer);
    debug!(observer = %observer, timer_id = %id, was_member, "observer unsubscribed");
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::sync::mpsc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::clock_store::MemoryClockStore,
        state::{AppState, clock::ManualClock, timer::RunState},
    };

    fn setup() -> (SharedState, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let state = AppState::with_parts(
            AppConfig::default(),
            Arc::new(MemoryClockStore::new(100)),
            clock.clone(),
        );
        (state, clock)
    }

    fn id(raw: &str) -> TimerId {
        TimerId::parse(raw).unwrap()
    }

    fn observe(state: &SharedState, timer: &TimerId) -> (ObserverId, mpsc::Receiver<TimerUpdate>) {
        let (observer, rx) = state.dispatcher().connect();
        state.dispatcher().registry().join(timer, observer);
        (observer, rx)
    }

    #[tokio::test(start_paused = true)]
    async fn each_command_pushes_exactly_once() {
        let (state, clock) = setup();
        let timer = id("7");
        let (_observer, mut rx) = observe(&state, &timer);

        reset(&state, &timer).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            TimerUpdate::new(timer.clone(), "6:00", RunState::Paused)
        );
        assert!(rx.try_recv().is_err());

        start(&state, &timer).await.unwrap();
        assert_eq!(rx.try_recv().unwrap().state, RunState::Running);
        assert!(rx.try_recv().is_err());
        assert!(state.ticker().is_ticking(&timer));

        clock.advance_secs(65);
        let stopped = stop(&state, &timer).await.unwrap();
        assert_eq!(stopped.time, "4:55");
        assert_eq!(
            rx.try_recv().unwrap(),
            TimerUpdate::new(timer.clone(), "4:55", RunState::Paused)
        );
        assert!(rx.try_recv().is_err());
        assert!(!state.ticker().is_ticking(&timer));
    }

    #[tokio::test(start_paused = true)]
    async fn no_tick_arrives_after_stop() {
        let (state, _clock) = setup();
        let timer = id("7");
        let (_observer, mut rx) = observe(&state, &timer);

        start(&state, &timer).await.unwrap();
        rx.try_recv().unwrap();
        stop(&state, &timer).await.unwrap();
        rx.try_recv().unwrap();

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn reset_cancels_ticking() {
        let (state, _clock) = setup();
        let timer = id("7");
        start(&state, &timer).await.unwrap();
        assert!(state.ticker().is_ticking(&timer));

        let record = reset(&state, &timer).await;
        assert_eq!(record.state, RunState::Paused);
        assert!(!state.ticker().is_ticking(&timer));
    }

    #[tokio::test]
    async fn rejected_commands_push_nothing() {
        let (state, _clock) = setup();
        let timer = id("7");
        let (_observer, mut rx) = observe(&state, &timer);

        assert!(matches!(
            stop(&state, &timer).await,
            Err(ServiceError::InvalidState(_))
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn late_subscriber_receives_current_state_only_when_recorded() {
        let (state, clock) = setup();
        let timer = id("7");
        let (observer, mut rx) = state.dispatcher().connect();

        subscribe(&state, observer, &timer).await;
        assert!(rx.try_recv().is_err());
        assert!(current_update(&state, &timer).await.is_err());

        assert_eq!(display(&state, &timer).await, "6:00");
        clock.advance_secs(10);
        subscribe(&state, observer, &timer).await;
        assert_eq!(
            rx.try_recv().unwrap(),
            TimerUpdate::new(timer.clone(), "6:00", RunState::Paused)
        );

        unsubscribe(&state, observer, &timer);
        unsubscribe(&state, observer, &timer);
        reset(&state, &timer).await;
        assert!(rx.try_recv().is_err());
    }
}
