//! Cache storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::traits::CacheEntry;

/// Trait for cache storage backends.
///
/// Keys are compared by plain string equality, so callers must hand in
/// canonical request targets.
pub trait CacheStorage<T>: Send + Sync {
  /// Get the entry stored for a key.
  fn get(&self, key: &str) -> Option<CacheEntry<T>>;

  /// Store an entry, replacing whatever was there.
  fn put(&self, key: &str, entry: CacheEntry<T>);
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl<T> CacheStorage<T> for NoopStorage {
  fn get(&self, _key: &str) -> Option<CacheEntry<T>> {
    None // Always miss
  }

  fn put(&self, _key: &str, _entry: CacheEntry<T>) {
    // Discard
  }
}

/// Unbounded in-memory storage guarded by a readers/writer lock.
///
/// A `put` swaps the whole entry under the write lock, so a reader sees
/// either the previous entry or the new one, never a mix.
pub struct MemoryStorage<T> {
  entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      entries: RwLock::new(HashMap::new()),
    }
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .len()
  }
}

impl<T> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + Send + Sync> CacheStorage<T> for MemoryStorage<T> {
  fn get(&self, key: &str) -> Option<CacheEntry<T>> {
    // The map is never left half-updated, so a poisoned lock is still usable.
    self
      .entries
      .read()
      .unwrap_or_else(PoisonError::into_inner)
      .get(key)
      .cloned()
  }

  fn put(&self, key: &str, entry: CacheEntry<T>) {
    self
      .entries
      .write()
      .unwrap_or_else(PoisonError::into_inner)
      .insert(key.to_string(), entry);
  }
}

/// Either real storage or the no-op one, picked from config at startup.
pub enum Storage<T> {
  Memory(MemoryStorage<T>),
  Disabled(NoopStorage),
}

impl<T> Storage<T> {
  pub fn new(enabled: bool) -> Self {
    if enabled {
      Self::Memory(MemoryStorage::new())
    } else {
      Self::Disabled(NoopStorage)
    }
  }
}

impl<T: Clone + Send + Sync> CacheStorage<T> for Storage<T> {
  fn get(&self, key: &str) -> Option<CacheEntry<T>> {
    match self {
      Self::Memory(storage) => storage.get(key),
      Self::Disabled(storage) => storage.get(key),
    }
  }

  fn put(&self, key: &str, entry: CacheEntry<T>) {
    match self {
      Self::Memory(storage) => storage.put(key, entry),
      Self::Disabled(storage) => storage.put(key, entry),
    }
  }
}
