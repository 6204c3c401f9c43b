//! Composition root: wires stores, transport, and policies into the loader
//! graphs the front end consumes.

use bytes::Bytes;
use std::sync::Arc;
use url::Url;
use uuid::Uuid;

use crate::api::{map_feed, map_image_comments, map_image_data, Endpoint, FeedImage, ImageComment};
use crate::cache::{
  CachePolicy, Clock, ImageDataCache, ImageDataStore, LocalImageDataLoader, LocalLoader,
  SnapshotCache, SnapshotStore,
};
use crate::error::LoadResult;
use crate::loader::{
  CachingLoader, FallbackLoader, HttpClient, MainQueue, MainQueueDispatch, RemoteLoader,
  TaskLoader,
};
use crate::presentation::{
  generic_error, ImageCommentViewModel, ImageCommentsPresenter, ImageDataLoader,
  ResourcePresentationAdapter, ResourceView,
};

/// Remote feed, falling back to a fresh local snapshot, saving remote hits.
pub type FeedLoader<S, C> = CachingLoader<
  FallbackLoader<RemoteLoader<Arc<C>, Vec<FeedImage>>, LocalLoader<Arc<S>, FeedImage>>,
  SnapshotCache<Arc<S>>,
>;

/// Comments are never cached.
pub type CommentsLoader<C> = RemoteLoader<Arc<C>, Vec<ImageComment>>;

/// Cached payload first, then the network with write-through.
pub type ImageLoader<S, C> = FallbackLoader<
  LocalImageDataLoader<Arc<S>>,
  CachingLoader<RemoteLoader<Arc<C>, Bytes>, ImageDataCache<Arc<S>>>,
>;

pub type FeedAdapter<S, C> = ResourcePresentationAdapter<FeedLoader<S, C>, Vec<FeedImage>>;

pub type CommentsAdapter<C> =
  ResourcePresentationAdapter<CommentsLoader<C>, Vec<ImageCommentViewModel>>;

pub struct FeedComposer<S, C> {
  store: Arc<S>,
  client: Arc<C>,
  base_url: Url,
  policy: CachePolicy,
  clock: Arc<dyn Clock>,
  queue: MainQueue,
}

impl<S, C> FeedComposer<S, C>
where
  S: SnapshotStore<FeedImage> + ImageDataStore,
  C: HttpClient,
{
  pub fn new(
    store: Arc<S>,
    client: Arc<C>,
    base_url: Url,
    policy: CachePolicy,
    clock: Arc<dyn Clock>,
    queue: MainQueue,
  ) -> Self {
    Self {
      store,
      client,
      base_url,
      policy,
      clock,
      queue,
    }
  }

  pub fn feed_loader(&self) -> FeedLoader<S, C> {
    CachingLoader::new(
      FallbackLoader::new(
        RemoteLoader::new(
          Arc::clone(&self.client),
          Endpoint::Feed.url(&self.base_url),
          map_feed,
        ),
        self.local_feed_loader(),
      ),
      SnapshotCache::new(Arc::clone(&self.store), Arc::clone(&self.clock)),
    )
  }

  pub fn comments_loader(&self, image_id: Uuid) -> CommentsLoader<C> {
    RemoteLoader::new(
      Arc::clone(&self.client),
      Endpoint::ImageComments(image_id).url(&self.base_url),
      map_image_comments,
    )
  }

  /// Cancellable image payload loads keyed by URL, completing on the main queue.
  pub fn image_loader(&self) -> Arc<dyn ImageDataLoader> {
    let store = Arc::clone(&self.store);
    let client = Arc::clone(&self.client);
    let make = move |url: Url| -> ImageLoader<S, C> {
      FallbackLoader::new(
        LocalImageDataLoader::new(Arc::clone(&store), url.clone()),
        CachingLoader::new(
          RemoteLoader::new(Arc::clone(&client), url.clone(), map_image_data),
          ImageDataCache::new(Arc::clone(&store), url),
        ),
      )
    };
    Arc::new(MainQueueDispatch::new(TaskLoader::new(make), self.queue.clone()))
  }

  pub fn feed_adapter(&self, view: Arc<dyn ResourceView<Vec<FeedImage>>>) -> FeedAdapter<S, C> {
    ResourcePresentationAdapter::new(
      MainQueueDispatch::new(self.feed_loader(), self.queue.clone()),
      Arc::new(|images: Vec<FeedImage>| -> LoadResult<Vec<FeedImage>> { Ok(images) }),
      generic_error(),
      view,
    )
  }

  pub fn comments_adapter(
    &self,
    image_id: Uuid,
    view: Arc<dyn ResourceView<Vec<ImageCommentViewModel>>>,
  ) -> CommentsAdapter<C> {
    let presenter = ImageCommentsPresenter::new(Arc::clone(&self.clock));
    ResourcePresentationAdapter::new(
      MainQueueDispatch::new(self.comments_loader(image_id), self.queue.clone()),
      Arc::new(
        move |comments: Vec<ImageComment>| -> LoadResult<Vec<ImageCommentViewModel>> {
          Ok(presenter.map(comments))
        },
      ),
      generic_error(),
      view,
    )
  }

  /// Lifecycle hook for the host going to the background: drops an expired
  /// feed snapshot.
  pub fn enter_background(&self) {
    self.local_feed_loader().validate_cache();
  }

  fn local_feed_loader(&self) -> LocalLoader<Arc<S>, FeedImage> {
    LocalLoader::new(Arc::clone(&self.store), self.policy, Arc::clone(&self.clock))
  }
}
