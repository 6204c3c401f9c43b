//! Drives a view through loading, content, and error states.
//!
//! Like a query in the terminal client, an adapter owns one loader and turns
//! its outcome into observable states. Each load emits exactly two states:
//!
//! ```ignore
//! adapter.load();
//! // view sees: { is_loading: true,  content: None,     error_message: None }
//! // then:      { is_loading: false, content: Some(vm), error_message: None }
//! //   or:      { is_loading: false, content: None,     error_message: Some(msg) }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::LoadResult;
use crate::loader::{Loader, MainQueueDispatch};

/// Everything a resource view needs to render itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceViewState<VM> {
  pub is_loading: bool,
  pub content: Option<VM>,
  pub error_message: Option<String>,
}

impl<VM> ResourceViewState<VM> {
  pub fn idle() -> Self {
    Self {
      is_loading: false,
      content: None,
      error_message: None,
    }
  }

  pub fn loading() -> Self {
    Self {
      is_loading: true,
      ..Self::idle()
    }
  }

  pub fn loaded(content: VM) -> Self {
    Self {
      content: Some(content),
      ..Self::idle()
    }
  }

  pub fn failed(message: impl Into<String>) -> Self {
    Self {
      error_message: Some(message.into()),
      ..Self::idle()
    }
  }
}

impl<VM> Default for ResourceViewState<VM> {
  fn default() -> Self {
    Self::idle()
  }
}

/// Receives view states, always on the UI context.
pub trait ResourceView<VM>: Send + Sync + 'static {
  fn display(&self, state: ResourceViewState<VM>);
}

/// A view that just remembers the latest state, for renderers that pull.
pub struct LatestState<VM> {
  state: Mutex<ResourceViewState<VM>>,
}

impl<VM: Clone> LatestState<VM> {
  /// A fresh idle state, shared between the adapter and the renderer.
  pub fn shared() -> Arc<Self> {
    Arc::new(Self {
      state: Mutex::new(ResourceViewState::idle()),
    })
  }

  pub fn get(&self) -> ResourceViewState<VM> {
    match self.state.lock() {
      Ok(state) => state.clone(),
      Err(poisoned) => poisoned.into_inner().clone(),
    }
  }
}

impl<VM: Send + 'static> ResourceView<VM> for LatestState<VM> {
  fn display(&self, state: ResourceViewState<VM>) {
    match self.state.lock() {
      Ok(mut current) => *current = state,
      Err(poisoned) => *poisoned.into_inner() = state,
    }
  }
}

/// Turns a loaded resource into its view model.
pub type Mapper<R, VM> = Arc<dyn Fn(R) -> LoadResult<VM> + Send + Sync>;

/// Owns the loading flag of one load. If the completion is dropped without
/// running (closed main queue, panicked load task), the flag is released and
/// the view is told the load failed.
struct InFlight<VM: Send + 'static> {
  is_loading: Arc<AtomicBool>,
  view: Arc<dyn ResourceView<VM>>,
  error_message: String,
  settled: bool,
}

impl<VM: Send + 'static> InFlight<VM> {
  fn settle(mut self, state: ResourceViewState<VM>) {
    self.settled = true;
    self.is_loading.store(false, Ordering::SeqCst);
    self.view.display(state);
  }
}

impl<VM: Send + 'static> Drop for InFlight<VM> {
  fn drop(&mut self) {
    if self.settled {
      return;
    }
    warn!("resource load was never delivered");
    self.is_loading.store(false, Ordering::SeqCst);
    self
      .view
      .display(ResourceViewState::failed(self.error_message.clone()));
  }
}

/// Connects a main-queue loader to a [`ResourceView`].
pub struct ResourcePresentationAdapter<L: Loader, VM> {
  loader: MainQueueDispatch<L>,
  map: Mapper<L::Output, VM>,
  error_message: String,
  view: Arc<dyn ResourceView<VM>>,
  is_loading: Arc<AtomicBool>,
}

impl<L, VM> ResourcePresentationAdapter<L, VM>
where
  L: Loader,
  VM: Send + 'static,
{
  /// `error_message` is shown for every failure; error details are only logged.
  pub fn new(
    loader: MainQueueDispatch<L>,
    map: Mapper<L::Output, VM>,
    error_message: impl Into<String>,
    view: Arc<dyn ResourceView<VM>>,
  ) -> Self {
    Self {
      loader,
      map,
      error_message: error_message.into(),
      view,
      is_loading: Arc::new(AtomicBool::new(false)),
    }
  }

  /// Emit the loading state and start a load, unless one is in flight.
  pub fn load(&self) -> Option<JoinHandle<()>> {
    if self.is_loading.swap(true, Ordering::SeqCst) {
      return None;
    }
    self.view.display(ResourceViewState::loading());

    let map = Arc::clone(&self.map);
    let in_flight = InFlight {
      is_loading: Arc::clone(&self.is_loading),
      view: Arc::clone(&self.view),
      error_message: self.error_message.clone(),
      settled: false,
    };

    Some(self.loader.load(move |result| {
      let state = match result.and_then(|resource| map(resource)) {
        Ok(content) => ResourceViewState::loaded(content),
        Err(error) => {
          debug!(%error, cache_miss = error.is_cache_miss(), "resource load failed");
          ResourceViewState::failed(in_flight.error_message.clone())
        }
      };
      in_flight.settle(state);
    }))
  }
}
