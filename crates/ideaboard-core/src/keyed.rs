//! Per-user ephemeral state: refinement sessions and unpublished drafts.
//!
//! Entries are created on first touch and consumed with [`KeyedStore::remove`].
//! Implementations must be safe to share between concurrently running event
//! handlers. [`MemoryStore`] is process-local; a multi-instance deployment
//! would need an external implementation with the same contract.

use dashmap::DashMap;

use crate::idea::UserId;

pub trait KeyedStore<V>: Send + Sync {
  /// A copy of the current value for `key`.
  fn get(&self, key: UserId) -> Option<V>;

  /// Insert or replace the value for `key`.
  fn set(&self, key: UserId, value: V);

  /// Take the value for `key` out of the store.
  fn remove(&self, key: UserId) -> Option<V>;

  fn contains(&self, key: UserId) -> bool { self.get(key).is_some() }
}

/// [`KeyedStore`] over a concurrent hash map.
#[derive(Debug)]
pub struct MemoryStore<V> {
  entries: DashMap<UserId, V>,
}

impl<V> MemoryStore<V> {
  pub fn new() -> Self { Self { entries: DashMap::new() } }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<V> Default for MemoryStore<V> {
  fn default() -> Self { Self::new() }
}

impl<V> KeyedStore<V> for MemoryStore<V>
where
  V: Clone + Send + Sync,
{
  fn get(&self, key: UserId) -> Option<V> {
    self.entries.get(&key).map(|entry| entry.value().clone())
  }

  fn set(&self, key: UserId, value: V) { self.entries.insert(key, value); }

  fn remove(&self, key: UserId) -> Option<V> {
    self.entries.remove(&key).map(|(_, v)| v)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn set_get_remove_lifecycle() {
    let store: MemoryStore<String> = MemoryStore::new();
    assert!(store.get(1).is_none());

    store.set(1, "first".into());
    store.set(1, "second".into());
    assert_eq!(store.get(1).as_deref(), Some("second"));
    assert_eq!(store.len(), 1);

    assert_eq!(store.remove(1).as_deref(), Some("second"));
    assert!(store.remove(1).is_none());
    assert!(!store.contains(1));
  }

  #[test]
  fn keys_are_independent() {
    let store: MemoryStore<u32> = MemoryStore::default();
    store.set(1, 10);
    store.set(2, 20);
    store.remove(1);
    assert_eq!(store.get(2), Some(20));
  }
}
