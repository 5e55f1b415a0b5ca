/// Wall clock abstraction.
pub mod clock;
/// Per-observer update queues.
pub mod dispatcher;
/// Store-backed timer commands.
pub mod engine;
/// Observer to timer membership.
pub mod subscriptions;
/// Periodic pushes for running timers.
pub mod ticker;
/// Timer records and countdown arithmetic.
pub mod timer;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    config::AppConfig,
    dao::clock_store::{ClockStore, MemoryClockStore},
};

use self::{
    clock::{Clock, SystemClock},
    dispatcher::Dispatcher,
    engine::TimerEngine,
    ticker::TickScheduler,
};

/// Shared handle passed to every route and task.
pub type SharedState = Arc<AppState>;

/// Central application state: the timer engine, observer fan-out and tick tasks.
pub struct AppState {
    config: Arc<AppConfig>,
    engine: Arc<TimerEngine>,
    dispatcher: Arc<Dispatcher>,
    ticker: TickScheduler,
    shutdown: CancellationToken,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// Uses the in-memory clock store and the system wall clock.
    pub fn new(config: AppConfig) -> SharedState {
        let store = Arc::new(MemoryClockStore::new(config.store_capacity));
        Self::with_parts(config, store, Arc::new(SystemClock))
    }

    /// Build the state around a caller-provided store and clock.
    pub fn with_parts(
        config: AppConfig,
        store: Arc<dyn ClockStore>,
        clock: Arc<dyn Clock>,
    ) -> SharedState {
        let engine = Arc::new(TimerEngine::new(store, clock, &config));
        let dispatcher = Arc::new(Dispatcher::new(config.observer_buffer));
        let ticker = TickScheduler::new(engine.clone(), dispatcher.clone(), config.tick_interval);
        Arc::new(Self {
            config: Arc::new(config),
            engine,
            dispatcher,
            ticker,
            shutdown: CancellationToken::new(),
        })
    }

    /// Runtime configuration.
    pub fn config(&self) -> Arc<AppConfig> {
        self.config.clone()
    }

    /// Timer engine over the clock store.
    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    /// Observer fan-out.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Tick task registry.
    pub fn ticker(&self) -> &TickScheduler {
        &self.ticker
    }

    /// Token cancelled once the server begins shutting down.
    pub fn shutdown(&self) -> &CancellationToken {
        &self.shutdown
    }
}
