use tracing::debug;

use super::Loader;
use crate::error::LoadResult;

/// Tries `primary`, and only once it has failed, `fallback`.
///
/// The fallback's outcome is final, success or failure. The two loads are
/// never in flight at the same time.
pub struct FallbackLoader<P, F> {
  primary: P,
  fallback: F,
}

impl<P, F> FallbackLoader<P, F> {
  pub fn new(primary: P, fallback: F) -> Self {
    Self { primary, fallback }
  }
}

impl<P, F> Loader for FallbackLoader<P, F>
where
  P: Loader,
  F: Loader<Output = P::Output>,
{
  type Output = P::Output;

  async fn load(&self) -> LoadResult<Self::Output> {
    match self.primary.load().await {
      Ok(value) => Ok(value),
      Err(error) => {
        debug!(%error, "primary loader failed, trying fallback");
        self.fallback.load().await
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::LoadError;
  use crate::loader::testing::StubLoader;

  #[tokio::test]
  async fn test_primary_success_skips_fallback() {
    let primary = StubLoader::succeeding(vec![1, 2]);
    let fallback = StubLoader::succeeding(vec![3]);
    let sut = FallbackLoader::new(primary.clone(), fallback.clone());

    assert_eq!(sut.load().await.unwrap(), vec![1, 2]);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 0);
  }

  #[tokio::test]
  async fn test_primary_failure_delivers_fallback_success() {
    let primary = StubLoader::<Vec<i32>>::failing(|| LoadError::Connectivity("offline".into()));
    let fallback = StubLoader::succeeding(vec![7, 8]);
    let sut = FallbackLoader::new(primary.clone(), fallback.clone());

    assert_eq!(sut.load().await.unwrap(), vec![7, 8]);
    assert_eq!(primary.calls(), 1);
    assert_eq!(fallback.calls(), 1);
  }

  #[tokio::test]
  async fn test_both_failing_delivers_fallback_error() {
    let primary = StubLoader::<Vec<i32>>::failing(|| LoadError::Connectivity("offline".into()));
    let fallback = StubLoader::<Vec<i32>>::failing(|| LoadError::EmptyCache);
    let sut = FallbackLoader::new(primary, fallback.clone());

    assert!(matches!(sut.load().await, Err(LoadError::EmptyCache)));
    assert_eq!(fallback.calls(), 1);
  }
}
