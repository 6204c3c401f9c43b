use bytes::Bytes;
use color_eyre::Result;
use tracing::debug;
use url::Url;

use super::traits::ImageDataStore;
use crate::error::{LoadError, LoadResult};
use crate::loader::{Cache, Loader};

/// Loads the cached payload for one URL.
pub struct LocalImageDataLoader<S> {
  store: S,
  url: Url,
}

impl<S: ImageDataStore> LocalImageDataLoader<S> {
  pub fn new(store: S, url: Url) -> Self {
    Self { store, url }
  }
}

impl<S: ImageDataStore> Loader for LocalImageDataLoader<S> {
  type Output = Bytes;

  async fn load(&self) -> LoadResult<Bytes> {
    match self.store.retrieve_data(&self.url) {
      Ok(Some(data)) => {
        debug!(url = %self.url, "serving cached image data");
        Ok(data)
      }
      Ok(None) => Err(LoadError::NotFound),
      Err(error) => Err(LoadError::Retrieval(error)),
    }
  }
}

/// Saves loaded payloads under one URL.
pub struct ImageDataCache<S> {
  store: S,
  url: Url,
}

impl<S: ImageDataStore> ImageDataCache<S> {
  pub fn new(store: S, url: Url) -> Self {
    Self { store, url }
  }
}

impl<S: ImageDataStore> Cache<Bytes> for ImageDataCache<S> {
  fn save(&self, data: &Bytes) -> Result<()> {
    self.store.insert_data(data, &self.url)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::storage::InMemoryStorage;
  use std::sync::Arc;

  type Store = Arc<InMemoryStorage<()>>;

  fn url() -> Url {
    Url::parse("https://a-url.com/image.png").unwrap()
  }

  #[tokio::test]
  async fn test_load_missing_data_is_not_found() {
    let sut = LocalImageDataLoader::new(Store::default(), url());

    assert!(matches!(sut.load().await, Err(LoadError::NotFound)));
  }

  #[tokio::test]
  async fn test_saved_data_is_loaded_for_same_url_only() {
    let store = Store::default();
    ImageDataCache::new(Arc::clone(&store), url())
      .save(&Bytes::from_static(b"png"))
      .unwrap();

    let same = LocalImageDataLoader::new(Arc::clone(&store), url());
    let other = LocalImageDataLoader::new(
      Arc::clone(&store),
      Url::parse("https://another-url.com/image.png").unwrap(),
    );

    assert_eq!(same.load().await.unwrap(), Bytes::from_static(b"png"));
    assert!(matches!(other.load().await, Err(LoadError::NotFound)));
  }
}
