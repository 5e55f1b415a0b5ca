use dashmap::DashMap;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info};

use crate::{
    dto::timer::TimerUpdate,
    state::{
        subscriptions::{ObserverId, SubscriptionRegistry},
        timer::{RunState, TimerId},
    },
};

/// Fans timer updates out to connected observers over bounded per-connection queues.
///
/// Delivery is best-effort: a full queue drops that update for that observer
/// only, and a closed queue disconnects the observer from every group.
pub struct Dispatcher {
    registry: SubscriptionRegistry,
    observers: DashMap<ObserverId, mpsc::Sender<TimerUpdate>>,
    buffer: usize,
}

impl Dispatcher {
    /// Build a dispatcher whose observer queues hold `buffer` pending updates.
    pub fn new(buffer: usize) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            observers: DashMap::new(),
            buffer: buffer.max(1),
        }
    }

    /// Membership index shared with the services.
    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    /// Register a new observer connection and hand back the receiving end of its queue.
    pub fn connect(&self) -> (ObserverId, mpsc::Receiver<TimerUpdate>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let observer = ObserverId::new();
        self.observers.insert(observer, tx);
        (observer, rx)
    }

    /// Forget an observer and every subscription it held.
    pub fn disconnect(&self, observer: ObserverId) -> Vec<TimerId> {
        self.observers.remove(&observer);
        self.registry.leave_all(observer)
    }

    /// Number of live observer connections.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Push an update to every member of the timer's group.
    pub fn broadcast(&self, timer: &TimerId, time: &str, state: RunState) {
        let members = self.registry.members_of(timer);
        if members.is_empty() {
            return;
        }
        let update = TimerUpdate::new(timer.clone(), time, state);
        debug!(timer_id = %timer, observers = members.len(), time = %time, ?state, "broadcasting timer update");
        for observer in members {
            self.deliver(observer, update.clone());
        }
    }

    /// Push an update to a single observer.
    pub fn notify_one(&self, observer: ObserverId, timer: &TimerId, time: &str, state: RunState) {
        self.deliver(observer, TimerUpdate::new(timer.clone(), time, state));
    }

    fn deliver(&self, observer: ObserverId, update: TimerUpdate) {
        let Some(tx) = self.observers.get(&observer).map(|entry| entry.value().clone()) else {
            // Member without a live connection: stale registry entry.
            self.registry.leave_all(observer);
            return;
        };

        match tx.try_send(update) {
            Ok(()) => {}
            Err(TrySendError::Full(update)) => {
                debug!(observer = %observer, timer_id = %update.id, "observer queue full; dropping update");
            }
            Err(TrySendError::Closed(_)) => {
                info!(observer = %observer, "observer queue closed; disconnecting");
                self.disconnect(observer);
            }
        }
    }
}
