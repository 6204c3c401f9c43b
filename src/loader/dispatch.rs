use std::marker::PhantomData;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::{Loader, TaskHandle, TaskLoader};
use crate::error::LoadResult;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// The UI-affine execution context.
///
/// Jobs dispatched from the owning thread run immediately; jobs from any
/// other thread are queued until the owner drains its [`MainQueueRunner`].
#[derive(Clone)]
pub struct MainQueue {
  thread: ThreadId,
  tx: mpsc::UnboundedSender<Job>,
}

/// Receiving end of a [`MainQueue`], pinned to the thread that created it.
pub struct MainQueueRunner {
  rx: mpsc::UnboundedReceiver<Job>,
  _not_send: PhantomData<*const ()>,
}

impl MainQueue {
  /// Make the calling thread the UI context.
  pub fn for_current_thread() -> (Self, MainQueueRunner) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queue = Self {
      thread: thread::current().id(),
      tx,
    };
    let runner = MainQueueRunner {
      rx,
      _not_send: PhantomData,
    };
    (queue, runner)
  }

  pub fn is_current(&self) -> bool {
    thread::current().id() == self.thread
  }

  /// Run `job` on the UI context.
  pub fn dispatch<F>(&self, job: F)
  where
    F: FnOnce() + Send + 'static,
  {
    if self.is_current() {
      job();
    } else if self.tx.send(Box::new(job)).is_err() {
      debug!("main queue closed, dropping job");
    }
  }
}

impl MainQueueRunner {
  /// Run every job queued so far. Returns how many ran.
  pub fn run_pending(&mut self) -> usize {
    let mut ran = 0;
    while let Ok(job) = self.rx.try_recv() {
      job();
      ran += 1;
    }
    ran
  }

  /// Wait for the next job and run it. Returns false once every queue handle
  /// has been dropped.
  pub async fn run_next(&mut self) -> bool {
    match self.rx.recv().await {
      Some(job) => {
        job();
        true
      }
      None => false,
    }
  }
}

/// Delivers a loader's outcome on the UI context.
pub struct MainQueueDispatch<L> {
  loader: Arc<L>,
  queue: MainQueue,
}

impl<L> MainQueueDispatch<L> {
  pub fn new(loader: L, queue: MainQueue) -> Self {
    Self {
      loader: Arc::new(loader),
      queue,
    }
  }
}

impl<L> Clone for MainQueueDispatch<L> {
  fn clone(&self) -> Self {
    Self {
      loader: Arc::clone(&self.loader),
      queue: self.queue.clone(),
    }
  }
}

impl<L: Loader> MainQueueDispatch<L> {
  /// Load once and call `completion` on the UI context.
  pub fn load<C>(&self, completion: C) -> JoinHandle<()>
  where
    C: FnOnce(LoadResult<L::Output>) + Send + 'static,
  {
    let loader = Arc::clone(&self.loader);
    let queue = self.queue.clone();
    tokio::spawn(async move {
      let result = loader.load().await;
      queue.dispatch(move || completion(result));
    })
  }
}

impl<K, L, F> MainQueueDispatch<TaskLoader<K, F>>
where
  K: Send + 'static,
  L: Loader,
  F: Fn(K) -> L + Send + Sync + 'static,
{
  /// Cancellable load whose completion runs on the UI context.
  ///
  /// Cancellation is checked again on the UI context, so a completion that
  /// was already queued when the handle was cancelled is dropped as well.
  pub fn load_task<C>(&self, key: K, completion: C) -> TaskHandle
  where
    C: FnOnce(LoadResult<L::Output>) + Send + 'static,
  {
    let handle = TaskHandle::new();
    let guard = handle.clone();
    let queue = self.queue.clone();
    self.loader.start(key, handle, move |result| {
      queue.dispatch(move || {
        if !guard.is_cancelled() {
          completion(result);
        }
      });
    })
  }
}
