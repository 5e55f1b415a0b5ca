/// In-memory TTL backend.
pub mod memory;

use std::time::Duration;

use futures::future::BoxFuture;

use crate::dao::{models::TimerEntity, storage::StorageResult};
use crate::state::timer::TimerId;

pub use memory::MemoryClockStore;

/// Key-value store holding one record per active timer, with per-key expiry.
///
/// Every operation is atomic for its key. An entry may disappear between a
/// `get` and a later `set` because of expiry or eviction.
pub trait ClockStore: Send + Sync {
    /// Fetch the live record for `id`, if any.
    fn get(&self, id: &TimerId) -> BoxFuture<'static, StorageResult<Option<TimerEntity>>>;
    /// Overwrite the record for `id` and restart its expiry window.
    fn set(
        &self,
        id: &TimerId,
        record: TimerEntity,
        ttl: Duration,
    ) -> BoxFuture<'static, StorageResult<()>>;
    /// Remove the record for `id`; absent ids are not an error.
    fn delete(&self, id: &TimerId) -> BoxFuture<'static, StorageResult<()>>;
    /// Drop entries whose expiry window has elapsed, returning how many went away.
    fn sweep_expired(&self) -> BoxFuture<'static, StorageResult<usize>>;
    /// Number of entries currently held, expired-but-unswept ones included.
    fn len(&self) -> usize;
    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// Probe that the backend answers.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
