//! Error taxonomy shared by every loader.

use thiserror::Error;

/// Outcome of a single load.
pub type LoadResult<T> = Result<T, LoadError>;

/// Why a load failed.
///
/// Only `Connectivity` and `InvalidData` normally reach the user; the cache
/// variants surface when a fallback chain has run out of sources.
#[derive(Debug, Error)]
pub enum LoadError {
  /// Transport unreachable, timed out, or aborted
  #[error("connectivity error: {0}")]
  Connectivity(String),

  /// Payload could not be turned into resource items
  #[error("invalid data")]
  InvalidData,

  /// No snapshot in the store
  #[error("cache is empty")]
  EmptyCache,

  /// Snapshot present but past its maximum age
  #[error("cache has expired")]
  ExpiredCache,

  /// No cached payload for the requested key
  #[error("not found in cache")]
  NotFound,

  /// The store itself failed to read
  #[error("cache retrieval failed: {0}")]
  Retrieval(color_eyre::Report),

  /// Image bytes the view layer could not decode
  #[error("invalid image data")]
  InvalidImage,
}

impl LoadError {
  /// True for failures that came from the cache side of a fallback chain.
  pub fn is_cache_miss(&self) -> bool {
    matches!(
      self,
      LoadError::EmptyCache | LoadError::ExpiredCache | LoadError::NotFound
    )
  }
}
