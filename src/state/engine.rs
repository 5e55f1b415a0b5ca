//! Timer commands and queries evaluated against the clock store.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};

use crate::{
    config::AppConfig,
    dao::{
        clock_store::ClockStore,
        storage::{StorageResult, with_deadline},
    },
    state::{
        clock::Clock,
        timer::{TimerId, TimerRecord, TimerStatus, TransitionRejected},
    },
};

/// Applies start/stop/reset transitions and derives remaining time on read.
///
/// Store failures never surface: a failed or timed-out read behaves like a
/// missing record, and a failed write is logged and otherwise ignored.
pub struct TimerEngine {
    store: Arc<dyn ClockStore>,
    clock: Arc<dyn Clock>,
    duration: Duration,
    ttl: Duration,
    store_timeout: Duration,
}

impl TimerEngine {
    /// Engine over `store`, reading time from `clock`.
    pub fn new(store: Arc<dyn ClockStore>, clock: Arc<dyn Clock>, config: &AppConfig) -> Self {
        Self {
            store,
            clock,
            duration: config.timer_duration,
            ttl: config.store_ttl,
            store_timeout: config.store_timeout,
        }
    }

    /// Backing clock store.
    pub fn store(&self) -> &Arc<dyn ClockStore> {
        &self.store
    }

    /// Current display text, creating a fresh paused record when none exists.
    pub async fn compute_display(&self, id: &TimerId) -> String {
        match self.load(id).await {
            Some(record) => self.status_of(record).display,
            None => self.reset(id).await.display,
        }
    }

    /// Current status without creating anything; `None` when no record is stored.
    pub async fn state(&self, id: &TimerId) -> Option<TimerStatus> {
        self.load(id).await.map(|record| self.status_of(record))
    }

    /// Resume (or begin) counting down.
    pub async fn start(&self, id: &TimerId) -> Result<TimerStatus, TransitionRejected> {
        let now = self.clock.now_ms();
        let current = self
            .load(id)
            .await
            .unwrap_or_else(|| TimerRecord::fresh(now));
        let next = current.start(now)?;
        self.persist(id, next).await;
        Ok(self.status_of(next))
    }

    /// Freeze a running countdown.
    pub async fn stop(&self, id: &TimerId) -> Result<TimerStatus, TransitionRejected> {
        let current = self
            .load(id)
            .await
            .ok_or(TransitionRejected::NotStarted)?;
        let next = current.stop(self.clock.now_ms())?;
        self.persist(id, next).await;
        Ok(self.status_of(next))
    }

    /// Replace whatever is stored with a full-duration paused record.
    pub async fn reset(&self, id: &TimerId) -> TimerStatus {
        if let Err(err) = self.bounded("delete", self.store.delete(id)).await {
            debug!(timer_id = %id, error = %err, "delete before reset failed; overwriting");
        }
        let fresh = TimerRecord::fresh(self.clock.now_ms());
        self.persist(id, fresh).await;
        self.status_of(fresh)
    }

    /// Evaluate `record` at the current instant.
    pub fn status_of(&self, record: TimerRecord) -> TimerStatus {
        TimerStatus::at(record, self.duration, self.clock.now_ms())
    }

    async fn load(&self, id: &TimerId) -> Option<TimerRecord> {
        match self.bounded("get", self.store.get(id)).await {
            Ok(entity) => entity.map(TimerRecord::from),
            Err(err) => {
                warn!(timer_id = %id, error = %err, "clock store read failed; treating timer as absent");
                None
            }
        }
    }

    async fn persist(&self, id: &TimerId, record: TimerRecord) {
        let write = self.store.set(id, record.into(), self.ttl);
        if let Err(err) = self.bounded("set", write).await {
            warn!(timer_id = %id, error = %err, "clock store write failed; update is best-effort");
        }
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        work: impl std::future::Future<Output = StorageResult<T>>,
    ) -> StorageResult<T> {
        with_deadline(operation, self.store_timeout, work).await
    }
}
