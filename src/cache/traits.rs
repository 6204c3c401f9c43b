//! Core traits and types for the caching system.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use url::Url;

/// Trait for resources whose collections can be cached as a snapshot.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Snapshot slot name for storage organization (e.g., "feed")
  fn snapshot_kind() -> &'static str;
}

/// A cached collection together with the moment it was saved.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSnapshot<T> {
  pub items: Vec<T>,
  pub timestamp: DateTime<Utc>,
}

/// Persists a single snapshot per resource kind.
///
/// Implementations serialize their own access; callers may use one store
/// from many loaders at once.
pub trait SnapshotStore<T: Cacheable>: Send + Sync + 'static {
  /// Current snapshot, if any.
  fn retrieve(&self) -> Result<Option<CachedSnapshot<T>>>;

  /// Replace the snapshot wholesale.
  fn insert(&self, items: &[T], timestamp: DateTime<Utc>) -> Result<()>;

  /// Remove the snapshot. Deleting an absent snapshot succeeds.
  fn delete(&self) -> Result<()>;
}

/// Persists binary payloads keyed by their source URL.
pub trait ImageDataStore: Send + Sync + 'static {
  fn insert_data(&self, data: &[u8], url: &Url) -> Result<()>;

  fn retrieve_data(&self, url: &Url) -> Result<Option<Bytes>>;
}

impl<T: Cacheable, S: SnapshotStore<T>> SnapshotStore<T> for Arc<S> {
  fn retrieve(&self) -> Result<Option<CachedSnapshot<T>>> {
    (**self).retrieve()
  }

  fn insert(&self, items: &[T], timestamp: DateTime<Utc>) -> Result<()> {
    (**self).insert(items, timestamp)
  }

  fn delete(&self) -> Result<()> {
    (**self).delete()
  }
}

impl<S: ImageDataStore> ImageDataStore for Arc<S> {
  fn insert_data(&self, data: &[u8], url: &Url) -> Result<()> {
    (**self).insert_data(data, url)
  }

  fn retrieve_data(&self, url: &Url) -> Result<Option<Bytes>> {
    (**self).retrieve_data(url)
  }
}

/// Source of "now" for timestamps and expiration checks.
pub trait Clock: Send + Sync + 'static {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }
}

/// A clock that always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> {
    self.0
  }
}
