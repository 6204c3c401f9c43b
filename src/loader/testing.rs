//! Test doubles for loaders and caches.

use color_eyre::{eyre::eyre, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

use super::{Cache, Loader};
use crate::error::{LoadError, LoadResult};

type Outcome<T> = Arc<dyn Fn() -> LoadResult<T> + Send + Sync>;

/// Loader that answers every call with the same outcome and counts calls.
pub struct StubLoader<T> {
  outcome: Outcome<T>,
  calls: Arc<AtomicUsize>,
}

impl<T> Clone for StubLoader<T> {
  fn clone(&self) -> Self {
    Self {
      outcome: Arc::clone(&self.outcome),
      calls: Arc::clone(&self.calls),
    }
  }
}

impl<T: Clone + Send + Sync + 'static> StubLoader<T> {
  pub fn succeeding(value: T) -> Self {
    Self {
      outcome: Arc::new(move || Ok(value.clone())),
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }

  pub fn failing(error: impl Fn() -> LoadError + Send + Sync + 'static) -> Self {
    Self {
      outcome: Arc::new(move || Err(error())),
      calls: Arc::new(AtomicUsize::new(0)),
    }
  }
}

impl<T> StubLoader<T> {
  pub fn calls(&self) -> usize {
    self.calls.load(Ordering::SeqCst)
  }
}

impl<T: Send + 'static> Loader for StubLoader<T> {
  type Output = T;

  async fn load(&self) -> LoadResult<T> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    (self.outcome)()
  }
}

/// Loader that stays pending until the test releases it.
pub struct GatedLoader<T> {
  inner: StubLoader<T>,
  gate: Arc<watch::Sender<bool>>,
}

impl<T> Clone for GatedLoader<T> {
  fn clone(&self) -> Self {
    Self {
      inner: self.inner.clone(),
      gate: Arc::clone(&self.gate),
    }
  }
}

impl<T> GatedLoader<T> {
  pub fn new(inner: StubLoader<T>) -> Self {
    Self {
      inner,
      gate: Arc::new(watch::Sender::new(false)),
    }
  }

  /// Let every pending and future load through.
  pub fn release(&self) {
    self.gate.send_replace(true);
  }

  pub fn calls(&self) -> usize {
    self.inner.calls()
  }
}

impl<T: Send + 'static> Loader for GatedLoader<T> {
  type Output = T;

  async fn load(&self) -> LoadResult<T> {
    let result = self.inner.load().await;
    let mut open = self.gate.subscribe();
    let _ = open.wait_for(|open| *open).await;
    result
  }
}

/// Cache that records what it was asked to save.
pub struct SpyCache<T> {
  saved: Arc<Mutex<Vec<T>>>,
  fail: bool,
}

impl<T> Clone for SpyCache<T> {
  fn clone(&self) -> Self {
    Self {
      saved: Arc::clone(&self.saved),
      fail: self.fail,
    }
  }
}

impl<T: Clone> SpyCache<T> {
  pub fn new() -> Self {
    Self {
      saved: Arc::new(Mutex::new(Vec::new())),
      fail: false,
    }
  }

  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::new()
    }
  }

  pub fn saved(&self) -> Vec<T> {
    self.saved.lock().unwrap().clone()
  }
}

impl<T: Clone + Send + 'static> Cache<T> for SpyCache<T> {
  fn save(&self, value: &T) -> Result<()> {
    self.saved.lock().unwrap().push(value.clone());
    if self.fail {
      Err(eyre!("disk full"))
    } else {
      Ok(())
    }
  }
}
