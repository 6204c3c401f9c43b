use bytes::Bytes;
use color_eyre::Result;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use super::Loader;
use crate::error::{LoadError, LoadResult};

/// Raw response from the network origin.
#[derive(Debug, Clone)]
pub struct HttpResponse {
  pub status: u16,
  pub body: Bytes,
}

/// Transport used by [`RemoteLoader`].
///
/// Dropping the returned future must abort the request.
pub trait HttpClient: Send + Sync + 'static {
  fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse>> + Send;
}

impl<C: HttpClient> HttpClient for Arc<C> {
  fn get(&self, url: &Url) -> impl Future<Output = Result<HttpResponse>> + Send {
    (**self).get(url)
  }
}

/// Fetches one URL and maps the response into a resource.
pub struct RemoteLoader<C, T> {
  client: C,
  url: Url,
  map: fn(HttpResponse) -> LoadResult<T>,
}

impl<C: HttpClient, T> RemoteLoader<C, T> {
  pub fn new(client: C, url: Url, map: fn(HttpResponse) -> LoadResult<T>) -> Self {
    Self { client, url, map }
  }
}

impl<C, T> Loader for RemoteLoader<C, T>
where
  C: HttpClient,
  T: Send + 'static,
{
  type Output = T;

  async fn load(&self) -> LoadResult<T> {
    debug!(url = %self.url, "requesting remote resource");
    let response = self
      .client
      .get(&self.url)
      .await
      .map_err(|e| LoadError::Connectivity(e.to_string()))?;
    (self.map)(response)
  }
}
