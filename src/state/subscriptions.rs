use std::{collections::HashSet, fmt};

use dashmap::DashMap;
use uuid::Uuid;

use crate::state::timer::TimerId;

/// Identifier handed to each observer connection (WebSocket or SSE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    /// Random identifier for a new connection.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Many-to-many membership between observers and the timers they follow.
///
/// Both directions are indexed so disconnect cleanup does not scan every
/// group. Reads racing a leave may or may not still see the leaving observer.
#[derive(Default)]
pub struct SubscriptionRegistry {
    groups: DashMap<TimerId, HashSet<ObserverId>>,
    memberships: DashMap<ObserverId, HashSet<TimerId>>,
}

impl SubscriptionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `observer` to the group of `timer`. Returns `false` if it was already a member.
    pub fn join(&self, timer: &TimerId, observer: ObserverId) -> bool {
        let inserted = self.groups.entry(timer.clone()).or_default().insert(observer);
        self.memberships
            .entry(observer)
            .or_default()
            .insert(timer.clone());
        inserted
    }

    /// Remove `observer` from the group of `timer`. Returns `false` if it was not a member.
    pub fn leave(&self, timer: &TimerId, observer: ObserverId) -> bool {
        let removed = self.remove_from_group(timer, observer);
        if let Some(mut timers) = self.memberships.get_mut(&observer) {
            timers.remove(timer);
        }
        self.memberships
            .remove_if(&observer, |_, timers| timers.is_empty());
        removed
    }

    /// Drop every membership of `observer`, returning the timers it was following.
    pub fn leave_all(&self, observer: ObserverId) -> Vec<TimerId> {
        let Some((_, timers)) = self.memberships.remove(&observer) else {
            return Vec::new();
        };
        timers
            .into_iter()
            .inspect(|timer| {
                self.remove_from_group(timer, observer);
            })
            .collect()
    }

    /// Snapshot of the observers following `timer`, possibly empty.
    pub fn members_of(&self, timer: &TimerId) -> Vec<ObserverId> {
        self.groups
            .get(timer)
            .map(|group| group.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Snapshot of the timers `observer` follows.
    pub fn groups_of(&self, observer: ObserverId) -> Vec<TimerId> {
        self.memberships
            .get(&observer)
            .map(|timers| timers.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of timers with at least one follower.
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    fn remove_from_group(&self, timer: &TimerId, observer: ObserverId) -> bool {
        let removed = self
            .groups
            .get_mut(timer)
            .is_some_and(|mut group| group.remove(&observer));
        self.groups.remove_if(timer, |_, group| group.is_empty());
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn id(raw: &str) -> TimerId {
        TimerId::parse(raw).unwrap()
    }

    #[test]
    fn join_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let observer = ObserverId::new();
        assert!(registry.join(&id("7"), observer));
        assert!(!registry.join(&id("7"), observer));
        assert_eq!(registry.members_of(&id("7")), vec![observer]);
    }

    #[test]
    fn leaving_non_member_is_a_no_op() {
        let registry = SubscriptionRegistry::new();
        let observer = ObserverId::new();
        assert!(!registry.leave(&id("7"), observer));
        registry.join(&id("8"), observer);
        assert!(!registry.leave(&id("7"), observer));
        assert_eq!(registry.groups_of(observer), vec![id("8")]);
    }

    #[test]
    fn groups_are_partitioned_by_timer() {
        let registry = SubscriptionRegistry::new();
        let (a, b) = (ObserverId::new(), ObserverId::new());
        registry.join(&id("1"), a);
        registry.join(&id("1"), b);
        registry.join(&id("2"), b);

        let mut first = registry.members_of(&id("1"));
        first.sort_by_key(|o| o.to_string());
        let mut expected = vec![a, b];
        expected.sort_by_key(|o| o.to_string());
        assert_eq!(first, expected);
        assert_eq!(registry.members_of(&id("2")), vec![b]);
        assert!(registry.members_of(&id("3")).is_empty());
    }

    #[test]
    fn leave_all_clears_every_group_and_prunes_empty_ones() {
        let registry = SubscriptionRegistry::new();
        let (a, b) = (ObserverId::new(), ObserverId::new());
        registry.join(&id("1"), a);
        registry.join(&id("2"), a);
        registry.join(&id("2"), b);

        let mut left = registry.leave_all(a);
        left.sort();
        assert_eq!(left, vec![id("1"), id("2")]);
        assert!(registry.members_of(&id("1")).is_empty());
        assert_eq!(registry.members_of(&id("2")), vec![b]);
        assert_eq!(registry.group_count(), 1);
        assert!(registry.leave_all(a).is_empty());
    }

    #[test]
    fn concurrent_joins_and_leaves_settle() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|n| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let observer = ObserverId::new();
                    for round in 0..50 {
                        let timer = id(&format!("t{}", round % 5));
                        registry.join(&timer, observer);
                        if n % 2 == 0 {
                            registry.leave(&timer, observer);
                        }
                    }
                    observer
                })
            })
            .collect();
        let observers: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for (n, observer) in observers.into_iter().enumerate() {
            let expected = if n % 2 == 0 { 0 } else { 5 };
            assert_eq!(registry.groups_of(observer).len(), expected);
        }
    }
}
