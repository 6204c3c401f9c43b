use std::marker::PhantomData;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::Loader;
use crate::error::LoadResult;

/// Handle to one in-flight [`TaskLoader`] load.
///
/// Cancelling guarantees the completion is never called, even if the
/// underlying load finishes at the same moment. Cancelling twice is a no-op.
#[derive(Debug, Clone, Default)]
pub struct TaskHandle {
  token: CancellationToken,
}

impl TaskHandle {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn cancel(&self) {
    self.token.cancel();
  }

  pub fn is_cancelled(&self) -> bool {
    self.token.is_cancelled()
  }
}

/// Issues independent, cancellable loads keyed by `K`.
///
/// `make` builds the loader graph for one key (typically a fallback/caching
/// composition over that key's remote and local sources). Repeated loads for
/// the same key are not deduplicated; each gets its own handle.
pub struct TaskLoader<K, F> {
  make: F,
  _key: PhantomData<fn(K)>,
}

impl<K, L, F> TaskLoader<K, F>
where
  K: Send + 'static,
  L: Loader,
  F: Fn(K) -> L + Send + Sync + 'static,
{
  pub fn new(make: F) -> Self {
    Self {
      make,
      _key: PhantomData,
    }
  }

  /// Start loading `key`. `completion` runs at most once, never after cancel.
  pub fn load<C>(&self, key: K, completion: C) -> TaskHandle
  where
    C: FnOnce(LoadResult<L::Output>) + Send + 'static,
  {
    self.start(key, TaskHandle::new(), completion)
  }

  pub(crate) fn start<C>(&self, key: K, handle: TaskHandle, completion: C) -> TaskHandle
  where
    C: FnOnce(LoadResult<L::Output>) + Send + 'static,
  {
    let loader = (self.make)(key);
    let token = handle.token.clone();

    tokio::spawn(async move {
      // Losing the race drops the load future, which aborts its I/O.
      let result = tokio::select! {
        biased;
        _ = token.cancelled() => {
          trace!("task cancelled before completion");
          return;
        }
        result = loader.load() => result,
      };

      if token.is_cancelled() {
        return;
      }
      completion(result);
    });

    handle
  }
}
