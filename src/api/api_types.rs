//! Serde-deserializable types matching feed API responses, and the mappers
//! that turn raw responses into domain types.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use url::Url;
use uuid::Uuid;

use super::types::{FeedImage, ImageComment};
use crate::error::{LoadError, LoadResult};
use crate::loader::HttpResponse;

// ============================================================================
// Feed endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiFeedResponse {
  pub items: Vec<ApiFeedItem>,
}

#[derive(Debug, Deserialize)]
pub struct ApiFeedItem {
  pub id: Uuid,
  pub description: Option<String>,
  pub location: Option<String>,
  pub image: Url,
}

// ============================================================================
// Image comments endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiCommentsResponse {
  pub items: Vec<ApiComment>,
}

#[derive(Debug, Deserialize)]
pub struct ApiComment {
  pub id: Uuid,
  pub message: String,
  #[serde(deserialize_with = "deserialize_iso8601")]
  pub created_at: DateTime<Utc>,
  pub author: ApiAuthor,
}

#[derive(Debug, Deserialize)]
pub struct ApiAuthor {
  pub username: String,
}

/// Accepts RFC 3339 as well as ISO 8601 offsets without a colon (`+0000`).
fn deserialize_iso8601<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
  D: serde::Deserializer<'de>,
{
  let s = String::deserialize(deserializer)?;
  DateTime::parse_from_rfc3339(&s)
    .or_else(|_| DateTime::parse_from_str(&s, "%Y-%m-%dT%H:%M:%S%z"))
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(serde::de::Error::custom)
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl From<ApiFeedItem> for FeedImage {
  fn from(item: ApiFeedItem) -> Self {
    FeedImage {
      id: item.id,
      description: item.description,
      location: item.location,
      url: item.image,
    }
  }
}

impl From<ApiComment> for ImageComment {
  fn from(comment: ApiComment) -> Self {
    ImageComment {
      id: comment.id,
      message: comment.message,
      created_at: comment.created_at,
      username: comment.author.username,
    }
  }
}

/// Feed responses are only valid with status 200.
pub fn map_feed(response: HttpResponse) -> LoadResult<Vec<FeedImage>> {
  if response.status != 200 {
    return Err(LoadError::InvalidData);
  }
  let parsed: ApiFeedResponse =
    serde_json::from_slice(&response.body).map_err(|_| LoadError::InvalidData)?;
  Ok(parsed.items.into_iter().map(FeedImage::from).collect())
}

/// Comment responses are valid with any 2xx status.
pub fn map_image_comments(response: HttpResponse) -> LoadResult<Vec<ImageComment>> {
  if !(200..300).contains(&response.status) {
    return Err(LoadError::InvalidData);
  }
  let parsed: ApiCommentsResponse =
    serde_json::from_slice(&response.body).map_err(|_| LoadError::InvalidData)?;
  Ok(parsed.items.into_iter().map(ImageComment::from).collect())
}

/// Image payloads must be non-empty and served with status 200.
pub fn map_image_data(response: HttpResponse) -> LoadResult<Bytes> {
  if response.status != 200 || response.body.is_empty() {
    return Err(LoadError::InvalidData);
  }
  Ok(response.body)
}

#[cfg(test)]
mod tests {
  use super::*;
  use rstest::rstest;
  use serde_json::json;

  fn response(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse {
      status,
      body: Bytes::from(serde_json::to_vec(&body).unwrap()),
    }
  }

  #[test]
  fn test_map_feed_items() {
    let body = json!({"items": [
      {
        "id": "2239cba2-cb35-4392-adc0-24a37d38e010",
        "description": "a description",
        "location": "a location",
        "image": "http://a-url.com/1.png"
      },
      {
        "id": "a28f5fe3-27a7-44e9-8df5-53742d0e4a5a",
        "image": "http://another-url.com/2.png"
      }
    ]});

    let items = map_feed(response(200, body)).unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].description.as_deref(), Some("a description"));
    assert_eq!(items[0].location.as_deref(), Some("a location"));
    assert_eq!(items[1].description, None);
    assert_eq!(items[1].url.as_str(), "http://another-url.com/2.png");
  }

  #[rstest]
  #[case(199)]
  #[case(201)]
  #[case(300)]
  #[case(400)]
  #[case(500)]
  fn test_map_feed_rejects_non_200(#[case] status: u16) {
    let result = map_feed(response(status, json!({"items": []})));

    assert!(matches!(result, Err(LoadError::InvalidData)));
  }

  #[test]
  fn test_map_feed_rejects_invalid_json() {
    let result = map_feed(HttpResponse {
      status: 200,
      body: Bytes::from_static(b"invalid json"),
    });

    assert!(matches!(result, Err(LoadError::InvalidData)));
  }

  #[rstest]
  #[case(200)]
  #[case(201)]
  #[case(250)]
  #[case(299)]
  fn test_map_comments_accepts_2xx(#[case] status: u16) {
    let body = json!({"items": [{
      "id": "2239cba2-cb35-4392-adc0-24a37d38e010",
      "message": "a message",
      "created_at": "2020-05-20T11:24:59+0000",
      "author": {"username": "a username"}
    }]});

    let comments = map_image_comments(response(status, body)).unwrap();

    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].message, "a message");
    assert_eq!(comments[0].username, "a username");
    assert_eq!(
      comments[0].created_at,
      DateTime::parse_from_rfc3339("2020-05-20T11:24:59Z").unwrap()
    );
  }

  #[test]
  fn test_map_comments_rejects_non_2xx() {
    let result = map_image_comments(response(404, json!({"items": []})));

    assert!(matches!(result, Err(LoadError::InvalidData)));
  }

  #[test]
  fn test_map_image_data() {
    let ok = HttpResponse {
      status: 200,
      body: Bytes::from_static(b"png"),
    };
    let empty = HttpResponse {
      status: 200,
      body: Bytes::new(),
    };

    assert_eq!(map_image_data(ok).unwrap(), Bytes::from_static(b"png"));
    assert!(matches!(map_image_data(empty), Err(LoadError::InvalidData)));
  }
}
