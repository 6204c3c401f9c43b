//! Composable resource loaders.
//!
//! Every source of data (network, local cache) and every policy layered on
//! top of one (fallback, write-through caching) implements [`Loader`], so an
//! application builds its loading strategy by nesting them:
//!
//! ```ignore
//! let loader = CachingLoader::new(
//!   FallbackLoader::new(remote, local),
//!   snapshot_cache,
//! );
//! ```
//!
//! Two boundaries switch to a completion-callback style: [`MainQueueDispatch`]
//! hands outcomes to the UI context, and [`TaskLoader`] issues cancellable
//! per-item loads.

mod caching;
mod dispatch;
mod fallback;
mod remote;
mod task;
#[cfg(test)]
pub(crate) mod testing;

pub use caching::CachingLoader;
pub use dispatch::{MainQueue, MainQueueDispatch, MainQueueRunner};
pub use fallback::FallbackLoader;
pub use remote::{HttpClient, HttpResponse, RemoteLoader};
pub use task::{TaskHandle, TaskLoader};

use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;

use crate::error::LoadResult;

/// Something that can fetch a resource asynchronously.
pub trait Loader: Send + Sync + 'static {
  /// The resource this loader produces
  type Output: Send + 'static;

  /// Fetch the resource once.
  fn load(&self) -> impl Future<Output = LoadResult<Self::Output>> + Send;
}

impl<L: Loader> Loader for Arc<L> {
  type Output = L::Output;

  fn load(&self) -> impl Future<Output = LoadResult<Self::Output>> + Send {
    (**self).load()
  }
}

/// Write side of a cache: remembers a successfully loaded value.
pub trait Cache<T>: Send + Sync + 'static {
  fn save(&self, value: &T) -> Result<()>;
}

impl<T, C: Cache<T>> Cache<T> for Arc<C> {
  fn save(&self, value: &T) -> Result<()> {
    (**self).save(value)
  }
}
