//! Local persistence and offline support.
//!
//! This module provides:
//! - Snapshot stores holding one timestamped collection per resource kind
//! - Binary payload stores keyed by URL
//! - An expiration policy shared by the read path and cache invalidation
//! - Loaders and caches that plug those stores into the loader composition

mod image;
mod layer;
mod policy;
mod storage;
mod traits;

pub use image::{ImageDataCache, LocalImageDataLoader};
pub use layer::{LocalLoader, SnapshotCache};
pub use policy::CachePolicy;
pub use storage::{InMemoryStorage, SqliteStorage};
pub use traits::{
  Cacheable, CachedSnapshot, Clock, FixedClock, ImageDataStore, SnapshotStore, SystemClock,
};
