//! Cache storage backends: in-memory and SQLite.

use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use url::Url;

use super::traits::{Cacheable, CachedSnapshot, ImageDataStore, SnapshotStore};

/// Storage that lives only as long as the process.
pub struct InMemoryStorage<T> {
  snapshot: Mutex<Option<CachedSnapshot<T>>>,
  images: Mutex<HashMap<Url, Bytes>>,
}

impl<T> InMemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      snapshot: Mutex::new(None),
      images: Mutex::new(HashMap::new()),
    }
  }
}

impl<T> Default for InMemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Cacheable> SnapshotStore<T> for InMemoryStorage<T> {
  fn retrieve(&self) -> Result<Option<CachedSnapshot<T>>> {
    let snapshot = self
      .snapshot
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(snapshot.clone())
  }

  fn insert(&self, items: &[T], timestamp: DateTime<Utc>) -> Result<()> {
    let mut snapshot = self
      .snapshot
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *snapshot = Some(CachedSnapshot {
      items: items.to_vec(),
      timestamp,
    });
    Ok(())
  }

  fn delete(&self) -> Result<()> {
    let mut snapshot = self
      .snapshot
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *snapshot = None;
    Ok(())
  }
}

impl<T: Send + 'static> ImageDataStore for InMemoryStorage<T> {
  fn insert_data(&self, data: &[u8], url: &Url) -> Result<()> {
    let mut images = self
      .images
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    images.insert(url.clone(), Bytes::copy_from_slice(data));
    Ok(())
  }

  fn retrieve_data(&self, url: &Url) -> Result<Option<Bytes>> {
    let images = self
      .images
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(images.get(url).cloned())
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open (or create) the cache database at `path`, or at the default
  /// location when `path` is `None`.
  pub fn open(path: Option<&Path>) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("feedline").join("cache.db"))
  }

  /// Run database migrations for cache tables.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(CACHE_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for cache tables.
const CACHE_SCHEMA: &str = r#"
-- One snapshot per resource kind (serialized JSON array)
CREATE TABLE IF NOT EXISTS snapshot_cache (
    kind TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL
);

-- Binary payloads keyed by source URL
CREATE TABLE IF NOT EXISTS image_cache (
    url TEXT PRIMARY KEY,
    data BLOB NOT NULL,
    cached_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl<T: Cacheable> SnapshotStore<T> for SqliteStorage {
  fn retrieve(&self) -> Result<Option<CachedSnapshot<T>>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM snapshot_cache WHERE kind = ?",
        params![T::snapshot_kind()],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to query snapshot: {}", e))?;

    match row {
      Some((data, cached_at)) => {
        let items: Vec<T> = serde_json::from_slice(&data)
          .map_err(|e| eyre!("Failed to deserialize snapshot: {}", e))?;
        let timestamp = parse_datetime(&cached_at)?;
        Ok(Some(CachedSnapshot { items, timestamp }))
      }
      None => Ok(None),
    }
  }

  fn insert(&self, items: &[T], timestamp: DateTime<Utc>) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let data = serde_json::to_vec(items).map_err(|e| eyre!("Failed to serialize snapshot: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO snapshot_cache (kind, data, cached_at) VALUES (?, ?, ?)",
        params![T::snapshot_kind(), data, format_datetime(timestamp)],
      )
      .map_err(|e| eyre!("Failed to store snapshot: {}", e))?;

    Ok(())
  }

  fn delete(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "DELETE FROM snapshot_cache WHERE kind = ?",
        params![T::snapshot_kind()],
      )
      .map_err(|e| eyre!("Failed to delete snapshot: {}", e))?;

    Ok(())
  }
}

impl ImageDataStore for SqliteStorage {
  fn insert_data(&self, data: &[u8], url: &Url) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO image_cache (url, data, cached_at) VALUES (?, ?, datetime('now'))",
        params![url.as_str(), data],
      )
      .map_err(|e| eyre!("Failed to store image data: {}", e))?;

    Ok(())
  }

  fn retrieve_data(&self, url: &Url) -> Result<Option<Bytes>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let data: Option<Vec<u8>> = conn
      .query_row(
        "SELECT data FROM image_cache WHERE url = ?",
        params![url.as_str()],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to query image data: {}", e))?;

    Ok(data.map(Bytes::from))
  }
}

fn format_datetime(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

/// Parse a datetime string stored by [`format_datetime`].
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
