//! Cache layer: the read path, the write path, and invalidation.
//!
//! Reading never mutates the store. Expired snapshots are only deleted by
//! [`LocalLoader::validate_cache`], which the host calls from a lifecycle
//! hook. Both decisions go through the same [`CachePolicy`] and [`Clock`].

use color_eyre::Result;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::policy::CachePolicy;
use super::traits::{Cacheable, Clock, SnapshotStore};
use crate::error::{LoadError, LoadResult};
use crate::loader::{Cache, Loader};

/// Loads the cached snapshot if it is still within the policy's max age.
pub struct LocalLoader<S, T> {
  store: S,
  policy: CachePolicy,
  clock: Arc<dyn Clock>,
  _items: PhantomData<fn() -> T>,
}

impl<S, T> LocalLoader<S, T>
where
  S: SnapshotStore<T>,
  T: Cacheable,
{
  pub fn new(store: S, policy: CachePolicy, clock: Arc<dyn Clock>) -> Self {
    Self {
      store,
      policy,
      clock,
      _items: PhantomData,
    }
  }

  /// Delete the snapshot if it has expired.
  ///
  /// A snapshot the store cannot read back is treated as corrupt and deleted
  /// too. Failures are logged, never returned.
  pub fn validate_cache(&self) {
    let kind = T::snapshot_kind();
    let should_delete = match self.store.retrieve() {
      Ok(None) => false,
      Ok(Some(snapshot)) => self.policy.is_expired(snapshot.timestamp, self.clock.now()),
      Err(error) => {
        warn!(kind, %error, "failed to read cache during validation");
        true
      }
    };

    if !should_delete {
      debug!(kind, "cache is valid");
      return;
    }

    match self.store.delete() {
      Ok(()) => info!(kind, "deleted invalid cache"),
      Err(error) => warn!(kind, %error, "failed to delete invalid cache"),
    }
  }
}

impl<S, T> Loader for LocalLoader<S, T>
where
  S: SnapshotStore<T>,
  T: Cacheable,
{
  type Output = Vec<T>;

  async fn load(&self) -> LoadResult<Vec<T>> {
    let kind = T::snapshot_kind();
    match self.store.retrieve() {
      Ok(Some(snapshot)) if !self.policy.is_expired(snapshot.timestamp, self.clock.now()) => {
        debug!(kind, count = snapshot.items.len(), "serving cached snapshot");
        Ok(snapshot.items)
      }
      Ok(Some(_)) => Err(LoadError::ExpiredCache),
      Ok(None) => Err(LoadError::EmptyCache),
      Err(error) => Err(LoadError::Retrieval(error)),
    }
  }
}

/// Saves loaded collections as the new snapshot, stamped with the clock's now.
pub struct SnapshotCache<S> {
  store: S,
  clock: Arc<dyn Clock>,
}

impl<S> SnapshotCache<S> {
  pub fn new(store: S, clock: Arc<dyn Clock>) -> Self {
    Self { store, clock }
  }
}

impl<S, T> Cache<Vec<T>> for SnapshotCache<S>
where
  S: SnapshotStore<T>,
  T: Cacheable,
{
  fn save(&self, items: &Vec<T>) -> Result<()> {
    self.store.insert(items, self.clock.now())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::InMemoryStorage;
  use crate::cache::traits::FixedClock;
  use crate::cache::CachedSnapshot;
  use chrono::{DateTime, Duration, Utc};
  use color_eyre::eyre::eyre;
  use serde::{Deserialize, Serialize};
  use std::sync::atomic::{AtomicUsize, Ordering};

  #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
  struct Item(u32);

  impl Cacheable for Item {
    fn snapshot_kind() -> &'static str {
      "item"
    }
  }

  fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-10T12:00:00Z")
      .unwrap()
      .with_timezone(&Utc)
  }

  fn store_with(age: Duration) -> Arc<InMemoryStorage<Item>> {
    let store = Arc::new(InMemoryStorage::new());
    store.insert(&[Item(1), Item(2)], now() - age).unwrap();
    store
  }

  fn loader(store: Arc<InMemoryStorage<Item>>) -> LocalLoader<Arc<InMemoryStorage<Item>>, Item> {
    LocalLoader::new(store, CachePolicy::default(), Arc::new(FixedClock(now())))
  }

  /// Store whose every operation fails, counting deletes.
  #[derive(Default)]
  struct BrokenStore {
    deletes: AtomicUsize,
  }

  impl SnapshotStore<Item> for BrokenStore {
    fn retrieve(&self) -> Result<Option<CachedSnapshot<Item>>> {
      Err(eyre!("corrupt"))
    }

    fn insert(&self, _items: &[Item], _timestamp: DateTime<Utc>) -> Result<()> {
      Err(eyre!("read-only"))
    }

    fn delete(&self) -> Result<()> {
      self.deletes.fetch_add(1, Ordering::SeqCst);
      Err(eyre!("read-only"))
    }
  }

  #[tokio::test]
  async fn test_load_empty_store_is_empty_cache() {
    let sut = loader(Arc::new(InMemoryStorage::new()));

    assert!(matches!(sut.load().await, Err(LoadError::EmptyCache)));
  }

  #[tokio::test]
  async fn test_load_fresh_snapshot_delivers_items() {
    let sut = loader(store_with(Duration::days(7) - Duration::seconds(1)));

    assert_eq!(sut.load().await.unwrap(), vec![Item(1), Item(2)]);
  }

  #[tokio::test]
  async fn test_load_expired_snapshot_is_expired_cache_and_keeps_it() {
    let store = store_with(Duration::days(7));
    let sut = loader(Arc::clone(&store));

    assert!(matches!(sut.load().await, Err(LoadError::ExpiredCache)));
    assert!(store.retrieve().unwrap().is_some());
  }

  #[tokio::test]
  async fn test_load_retrieval_error() {
    let sut = LocalLoader::<_, Item>::new(
      BrokenStore::default(),
      CachePolicy::default(),
      Arc::new(FixedClock(now())),
    );

    assert!(matches!(sut.load().await, Err(LoadError::Retrieval(_))));
  }

  #[test]
  fn test_validate_deletes_expired_snapshot() {
    let store = store_with(Duration::days(7));

    loader(Arc::clone(&store)).validate_cache();

    assert!(store.retrieve().unwrap().is_none());
  }

  #[test]
  fn test_validate_keeps_fresh_snapshot() {
    let store = store_with(Duration::days(6));
    let before = store.retrieve().unwrap();

    loader(Arc::clone(&store)).validate_cache();

    assert_eq!(store.retrieve().unwrap(), before);
  }

  #[test]
  fn test_validate_empty_store_is_noop() {
    let store = Arc::new(InMemoryStorage::<Item>::new());

    loader(Arc::clone(&store)).validate_cache();

    assert!(store.retrieve().unwrap().is_none());
  }

  #[test]
  fn test_validate_deletes_unreadable_cache_and_swallows_errors() {
    let store = Arc::new(BrokenStore::default());
    let sut = LocalLoader::<_, Item>::new(
      Arc::clone(&store),
      CachePolicy::default(),
      Arc::new(FixedClock(now())),
    );

    sut.validate_cache();

    assert_eq!(store.deletes.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn test_snapshot_cache_stamps_with_clock() {
    let store = Arc::new(InMemoryStorage::<Item>::new());
    let sut = SnapshotCache::new(Arc::clone(&store), Arc::new(FixedClock(now())));

    sut.save(&vec![Item(3)]).unwrap();

    assert_eq!(
      store.retrieve().unwrap(),
      Some(CachedSnapshot {
        items: vec![Item(3)],
        timestamp: now(),
      })
    );
  }
}
