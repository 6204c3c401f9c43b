use chrono::{DateTime, Duration, Utc};

/// How long a cached snapshot may be served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
  max_age: Duration,
}

impl CachePolicy {
  pub fn new(max_age: Duration) -> Self {
    Self { max_age }
  }

  pub fn max_age(&self) -> Duration {
    self.max_age
  }

  /// A snapshot is expired once its age reaches `max_age`.
  pub fn is_expired(&self, timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match timestamp.checked_add_signed(self.max_age) {
      Some(expires_at) => now >= expires_at,
      None => false,
    }
  }
}

impl Default for CachePolicy {
  fn default() -> Self {
    Self::new(Duration::days(7))
  }
}
