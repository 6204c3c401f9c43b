use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::cache::Cacheable;

/// One entry of the image feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedImage {
  pub id: Uuid,
  pub description: Option<String>,
  pub location: Option<String>,
  pub url: Url,
}

/// A comment left on a feed image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageComment {
  pub id: Uuid,
  pub message: String,
  pub created_at: DateTime<Utc>,
  pub username: String,
}

impl Cacheable for FeedImage {
  fn snapshot_kind() -> &'static str {
    "feed"
  }
}
