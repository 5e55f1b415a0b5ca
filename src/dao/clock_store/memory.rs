//! In-process clock store backed by a concurrent map with lazy and swept expiry.

use std::{sync::Arc, time::Duration};

use dashmap::DashMap;
use futures::future::BoxFuture;
use tokio::time::Instant;
use tracing::debug;

use crate::dao::{clock_store::ClockStore, models::TimerEntity, storage::StorageResult};
use crate::state::timer::TimerId;

#[derive(Debug, Clone, Copy)]
struct Slot {
    record: TimerEntity,
    expires_at: Instant,
}

impl Slot {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Bounded TTL cache keeping timer records in memory.
///
/// Inserting a new key while the cache is full evicts the entry closest to
/// expiry, which with a uniform TTL is also the least recently written one.
#[derive(Clone)]
pub struct MemoryClockStore {
    slots: Arc<DashMap<TimerId, Slot>>,
    capacity: usize,
}

impl MemoryClockStore {
    /// Create a store holding at most `capacity` records (never fewer than one).
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    fn evict_one(slots: &DashMap<TimerId, Slot>) {
        let victim = slots
            .iter()
            .min_by_key(|entry| entry.value().expires_at)
            .map(|entry| entry.key().clone());
        if let Some(id) = victim {
            slots.remove(&id);
            debug!(timer_id = %id, "clock store full; evicted oldest record");
        }
    }
}

impl ClockStore for MemoryClockStore {
    fn get(&self, id: &TimerId) -> BoxFuture<'static, StorageResult<Option<TimerEntity>>> {
        let slots = self.slots.clone();
        let id = id.clone();
        Box::pin(async move {
            let now = Instant::now();
            let live = slots.get(&id).map(|slot| *slot.value());
            match live {
                Some(slot) if !slot.is_expired(now) => Ok(Some(slot.record)),
                Some(_) => {
                    slots.remove_if(&id, |_, slot| slot.is_expired(now));
                    Ok(None)
                }
                None => Ok(None),
            }
        })
    }

    fn set(
        &self,
        id: &TimerId,
        record: TimerEntity,
        ttl: Duration,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let slots = self.slots.clone();
        let capacity = self.capacity;
        let id = id.clone();
        Box::pin(async move {
            if !slots.contains_key(&id) && slots.len() >= capacity {
                Self::evict_one(&slots);
            }
            let expires_at = Instant::now() + ttl;
            slots.insert(id, Slot { record, expires_at });
            Ok(())
        })
    }

    fn delete(&self, id: &TimerId) -> BoxFuture<'static, StorageResult<()>> {
        let slots = self.slots.clone();
        let id = id.clone();
        Box::pin(async move {
            slots.remove(&id);
            Ok(())
        })
    }

    fn sweep_expired(&self) -> BoxFuture<'static, StorageResult<usize>> {
        let slots = self.slots.clone();
        Box::pin(async move {
            let now = Instant::now();
            let before = slots.len();
            slots.retain(|_, slot| !slot.is_expired(now));
            Ok(before.saturating_sub(slots.len()))
        })
    }

    fn len(&self) -> usize {
        self.slots.len()
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
