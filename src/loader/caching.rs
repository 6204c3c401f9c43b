use tracing::{debug, warn};

use super::{Cache, Loader};
use crate::error::LoadResult;

/// Saves every successful load into a cache before handing it back.
///
/// A failed save is logged and otherwise ignored: the caller always receives
/// the loaded value. Failed loads pass through without touching the cache.
pub struct CachingLoader<L, C> {
  loader: L,
  cache: C,
}

impl<L, C> CachingLoader<L, C> {
  pub fn new(loader: L, cache: C) -> Self {
    Self { loader, cache }
  }
}

impl<L, C> Loader for CachingLoader<L, C>
where
  L: Loader,
  C: Cache<L::Output>,
{
  type Output = L::Output;

  async fn load(&self) -> LoadResult<Self::Output> {
    let value = self.loader.load().await?;
    match self.cache.save(&value) {
      Ok(()) => debug!("cached loaded resource"),
      Err(error) => warn!(%error, "failed to cache loaded resource"),
    }
    Ok(value)
  }
}
