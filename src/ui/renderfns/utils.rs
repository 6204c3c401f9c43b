use ratatui::prelude::Color;

use crate::presentation::ResourceViewState;

/// Truncate a string to a maximum length in characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Title suffix for a resource view: loading, error, or item count
pub fn state_suffix<T>(state: &ResourceViewState<Vec<T>>) -> String {
  if state.is_loading {
    "(loading...)".to_string()
  } else if let Some(message) = &state.error_message {
    format!("({})", message)
  } else {
    format!("({})", state.content.as_ref().map_or(0, Vec::len))
  }
}

/// Border color for a resource view
pub fn state_color<T>(state: &ResourceViewState<T>) -> Color {
  if state.error_message.is_some() {
    Color::Red
  } else {
    Color::Blue
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
  }

  #[test]
  fn test_truncate_exact_length() {
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("café olé", 6), "caf...");
  }

  #[test]
  fn test_state_suffix() {
    assert_eq!(state_suffix::<u8>(&ResourceViewState::loading()), "(loading...)");
    assert_eq!(state_suffix(&ResourceViewState::loaded(vec![1, 2])), "(2)");
    assert_eq!(
      state_suffix::<u8>(&ResourceViewState::failed("Couldn't connect to server")),
      "(Couldn't connect to server)"
    );
  }

  #[test]
  fn test_state_color() {
    assert_eq!(state_color::<u8>(&ResourceViewState::failed("x")), Color::Red);
    assert_eq!(state_color(&ResourceViewState::loaded(1)), Color::Blue);
  }
}
