use url::Url;
use uuid::Uuid;

/// Resources served by the feed API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
  Feed,
  ImageComments(Uuid),
}

impl Endpoint {
  /// Absolute URL of this endpoint under `base_url`.
  pub fn url(&self, base_url: &Url) -> Url {
    let path = match self {
      Endpoint::Feed => "v1/feed".to_string(),
      Endpoint::ImageComments(id) => format!("v1/image/{}/comments", id.hyphenated()),
    };

    let mut url = base_url.clone();
    let base_path = base_url.path().trim_end_matches('/');
    url.set_path(&format!("{}/{}", base_path, path));
    url
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_feed_endpoint_url() {
    let base = Url::parse("http://base-url.com").unwrap();

    assert_eq!(Endpoint::Feed.url(&base).as_str(), "http://base-url.com/v1/feed");
  }

  #[test]
  fn test_endpoints_keep_base_path() {
    let base = Url::parse("https://example.com/essential-feed").unwrap();
    let id = Uuid::parse_str("2239cba2-cb35-4392-adc0-24a37d38e010").unwrap();

    assert_eq!(
      Endpoint::Feed.url(&base).as_str(),
      "https://example.com/essential-feed/v1/feed"
    );
    assert_eq!(
      Endpoint::ImageComments(id).url(&base).as_str(),
      "https://example.com/essential-feed/v1/image/2239cba2-cb35-4392-adc0-24a37d38e010/comments"
    );
  }
}
