//! Periodic re-broadcast of running timers, one cancellable task per timer id.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::{DashMap, mapref::entry::Entry};
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval_at},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::state::{
    dispatcher::Dispatcher,
    engine::TimerEngine,
    timer::{RunState, TimerId},
};

/// Handle to a running tick task.
struct TickHandle {
    /// Distinguishes this task from a later replacement for the same id.
    generation: u64,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

/// Owns the tick tasks of running timers.
///
/// An entry is always cancelled before it is removed or replaced, so each id
/// has at most one live task.
pub struct TickScheduler {
    tasks: Arc<DashMap<TimerId, TickHandle>>,
    engine: Arc<TimerEngine>,
    dispatcher: Arc<Dispatcher>,
    interval: Duration,
    generation: AtomicU64,
}

impl TickScheduler {
    /// Scheduler pushing through `dispatcher` every `interval`.
    pub fn new(engine: Arc<TimerEngine>, dispatcher: Arc<Dispatcher>, interval: Duration) -> Self {
        Self {
            tasks: Arc::new(DashMap::new()),
            engine,
            dispatcher,
            interval,
            generation: AtomicU64::new(0),
        }
    }

    /// Start pushing updates for `id` every interval, replacing any task already doing so.
    pub fn ensure_ticking(&self, id: &TimerId) {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();

        // The entry lock is held across spawn so the new task cannot deregister
        // itself before it is registered.
        let entry = self.tasks.entry(id.clone());
        let join = tokio::spawn(run_ticks(TickContext {
            id: id.clone(),
            generation,
            cancel: cancel.clone(),
            engine: self.engine.clone(),
            dispatcher: self.dispatcher.clone(),
            tasks: self.tasks.clone(),
            interval: self.interval,
        }));
        let handle = TickHandle {
            generation,
            cancel,
            join,
        };
        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.get().cancel.cancel();
                occupied.insert(handle);
                debug!(timer_id = %id, "restarted tick task");
            }
            Entry::Vacant(vacant) => {
                vacant.insert(handle);
                debug!(timer_id = %id, "started tick task");
            }
        }
    }

    /// Stop pushing updates for `id`. Returns whether a task was active.
    pub fn cancel(&self, id: &TimerId) -> bool {
        match self.tasks.remove(id) {
            Some((_, handle)) => {
                handle.cancel.cancel();
                debug!(timer_id = %id, "cancelled tick task");
                true
            }
            None => false,
        }
    }

    /// Whether `id` has a live tick task.
    pub fn is_ticking(&self, id: &TimerId) -> bool {
        self.tasks.contains_key(id)
    }

    /// Number of timers currently ticking.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Whether no timer is ticking.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancel every task and wait for all of them to finish.
    pub async fn cancel_all(&self) {
        let ids: Vec<TimerId> = self.tasks.iter().map(|entry| entry.key().clone()).collect();
        let handles: Vec<TickHandle> = ids
            .iter()
            .filter_map(|id| self.tasks.remove(id).map(|(_, handle)| handle))
            .collect();

        for handle in &handles {
            handle.cancel.cancel();
        }
        for handle in handles {
            let _ = handle.join.await;
        }
    }
}

struct TickContext {
    id: TimerId,
    generation: u64,
    cancel: CancellationToken,
    engine: Arc<TimerEngine>,
    dispatcher: Arc<Dispatcher>,
    tasks: Arc<DashMap<TimerId, TickHandle>>,
    interval: Duration,
}

async fn run_ticks(ctx: TickContext) {
    let TickContext {
        id,
        generation,
        cancel,
        engine,
        dispatcher,
        tasks,
        interval,
    } = ctx;

    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let Some(status) = engine.state(&id).await else {
            debug!(timer_id = %id, "timer record gone; tick task stopping");
            break;
        };
        if status.run_state() == RunState::Paused {
            debug!(timer_id = %id, "timer paused; tick task stopping");
            break;
        }
        // Cancellation may have landed while the store was being read.
        if cancel.is_cancelled() {
            break;
        }

        dispatcher.broadcast(&id, &status.display, RunState::Running);

        if status.is_finished() {
            info!(timer_id = %id, "timer reached zero");
            break;
        }
    }

    tasks.remove_if(&id, |_, handle| handle.generation == generation);
}
