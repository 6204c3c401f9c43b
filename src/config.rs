use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cache::{CachePolicy, SqliteStorage};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
  /// Root of the feed API; may also be given with `--base-url`
  pub base_url: Option<Url>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: None,
      timeout_secs: default_timeout_secs(),
    }
  }
}

fn default_timeout_secs() -> u64 {
  10
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
  /// Persistent SQLite database
  #[default]
  Sqlite,
  /// Process-lifetime only
  Memory,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default)]
  pub backend: CacheBackend,
  /// Database file (defaults to $XDG_DATA_HOME/feedline/cache.db)
  pub path: Option<PathBuf>,
  #[serde(default = "default_max_age_days")]
  pub max_age_days: u32,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      backend: CacheBackend::default(),
      path: None,
      max_age_days: default_max_age_days(),
    }
  }
}

fn default_max_age_days() -> u32 {
  7
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./feedline.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/feedline/config.yaml
  ///
  /// Without a file, every setting takes its default.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from("feedline.yaml");
    if local.exists() {
      return Some(local);
    }

    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("feedline").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    // An empty file deserializes to null.
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents).map_err(|e| eyre!("{}", e))
  }

  pub fn base_url(&self) -> Result<&Url> {
    self.api.base_url.as_ref().ok_or_else(|| {
      eyre!(
        "No API base URL configured. Set api.base_url in ~/.config/feedline/config.yaml\n\
         or pass --base-url."
      )
    })
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.api.timeout_secs)
  }

  pub fn cache_policy(&self) -> CachePolicy {
    CachePolicy::new(chrono::Duration::days(i64::from(self.cache.max_age_days)))
  }

  pub fn cache_path(&self) -> Result<PathBuf> {
    match &self.cache.path {
      Some(path) => Ok(path.clone()),
      None => SqliteStorage::default_path(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  #[test]
  fn test_full_config() {
    let config = Config::parse(
      r#"
api:
  base_url: https://example.com/essential-feed
  timeout_secs: 3
cache:
  backend: memory
  path: /tmp/feed.db
  max_age_days: 2
"#,
    )
    .unwrap();

    assert_eq!(
      config.base_url().unwrap().as_str(),
      "https://example.com/essential-feed"
    );
    assert_eq!(config.timeout(), Duration::from_secs(3));
    assert_eq!(config.cache.backend, CacheBackend::Memory);
    assert_eq!(config.cache_path().unwrap(), PathBuf::from("/tmp/feed.db"));
    assert_eq!(config.cache_policy().max_age(), chrono::Duration::days(2));
  }

  #[test]
  fn test_defaults() {
    let config = Config::parse("api:\n  base_url: http://localhost:8080\n").unwrap();

    assert_eq!(config.timeout(), Duration::from_secs(10));
    assert_eq!(config.cache.backend, CacheBackend::Sqlite);
    assert_eq!(config.cache_policy(), CachePolicy::default());
  }

  #[test]
  fn test_empty_config_has_no_base_url() {
    let config = Config::parse("").unwrap();

    assert!(config.base_url().is_err());
  }

  #[test]
  fn test_unknown_backend_is_rejected() {
    assert!(Config::parse("cache:\n  backend: redis\n").is_err());
  }

  #[test]
  fn test_explicit_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "cache:\n  max_age_days: 1").unwrap();

    let config = Config::load(Some(file.path())).unwrap();

    assert_eq!(config.cache.max_age_days, 1);
  }

  #[test]
  fn test_missing_explicit_path_fails() {
    assert!(Config::load(Some(Path::new("/nonexistent/feedline.yaml"))).is_err());
  }
}
