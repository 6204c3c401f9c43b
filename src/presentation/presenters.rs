use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::strings::{
  localized, Table, FEED_VIEW_TITLE, GENERIC_CONNECTION_ERROR, IMAGE_COMMENTS_VIEW_TITLE,
};
use crate::api::{FeedImage, ImageComment};
use crate::cache::Clock;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedImageViewModel {
  pub description: Option<String>,
  pub location: Option<String>,
}

impl FeedImageViewModel {
  pub fn has_location(&self) -> bool {
    self.location.is_some()
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageCommentViewModel {
  pub message: String,
  pub date: String,
  pub username: String,
}

pub fn generic_error() -> &'static str {
  localized(Table::Shared, GENERIC_CONNECTION_ERROR)
}

pub struct FeedPresenter;

impl FeedPresenter {
  pub fn title() -> &'static str {
    localized(Table::Feed, FEED_VIEW_TITLE)
  }

  pub fn map(image: &FeedImage) -> FeedImageViewModel {
    FeedImageViewModel {
      description: image.description.clone(),
      location: image.location.clone(),
    }
  }
}

pub struct ImageCommentsPresenter {
  clock: Arc<dyn Clock>,
}

impl ImageCommentsPresenter {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self { clock }
  }

  pub fn title() -> &'static str {
    localized(Table::ImageComments, IMAGE_COMMENTS_VIEW_TITLE)
  }

  /// Order is preserved.
  pub fn map(&self, comments: Vec<ImageComment>) -> Vec<ImageCommentViewModel> {
    let now = self.clock.now();
    comments
      .into_iter()
      .map(|comment| ImageCommentViewModel {
        date: relative_date(comment.created_at, now),
        message: comment.message,
        username: comment.username,
      })
      .collect()
  }
}

/// "just now", "1 minute ago", "3 days ago", ... Future dates read as "just now".
pub fn relative_date(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let elapsed = now.signed_duration_since(then);
  let (count, unit) = if elapsed.num_days() >= 365 {
    (elapsed.num_days() / 365, "year")
  } else if elapsed.num_days() >= 30 {
    (elapsed.num_days() / 30, "month")
  } else if elapsed.num_days() >= 7 {
    (elapsed.num_weeks(), "week")
  } else if elapsed.num_days() >= 1 {
    (elapsed.num_days(), "day")
  } else if elapsed.num_hours() >= 1 {
    (elapsed.num_hours(), "hour")
  } else if elapsed.num_minutes() >= 1 {
    (elapsed.num_minutes(), "minute")
  } else {
    return "just now".to_string();
  };

  if count == 1 {
    format!("1 {} ago", unit)
  } else {
    format!("{} {}s ago", count, unit)
  }
}
