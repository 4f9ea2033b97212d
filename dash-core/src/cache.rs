//! Response cache with a fixed time-to-live.
//!
//! Entries are keyed by the full request URL and never invalidated early. Inserting the same key
//! twice just replaces the entry. When a file path is set the cache is loaded from and written
//! back to a JSON file, so it survives between runs.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct CachedResponse {
    stored_at: DateTime<Utc>,
    body: String,
}

#[derive(Debug)]
pub struct ResponseCache {
    ttl: Duration,
    path: Option<PathBuf>,
    entries: Mutex<HashMap<String, CachedResponse>>,
}

impl ResponseCache {
    pub fn in_memory(ttl: Duration) -> Self {
        Self { ttl, path: None, entries: Mutex::new(HashMap::new()) }
    }

    /// Open a file-backed cache. A missing or unreadable file starts an empty cache.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        let path = path.into();
        let entries = match load_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Ignoring response cache {}: {:#}", path.display(), e);
                HashMap::new()
            }
        };

        Self { ttl, path: Some(path), entries: Mutex::new(entries) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached body for `key` if it was stored less than `ttl` before `now`.
    pub fn get(&self, key: &str, now: DateTime<Utc>) -> Option<String> {
        let entries = self.entries.lock().ok()?;
        let entry = entries.get(key)?;

        let age = now.signed_duration_since(entry.stored_at).to_std().ok()?;
        if age < self.ttl {
            tracing::debug!("Cache hit for {} (age {:?})", key, age);
            Some(entry.body.clone())
        } else {
            None
        }
    }

    pub fn put(&self, key: &str, body: &str, now: DateTime<Utc>) {
        let snapshot = {
            let Ok(mut entries) = self.entries.lock() else {
                return;
            };

            entries.retain(|_, e| {
                now.signed_duration_since(e.stored_at).to_std().map(|age| age < self.ttl).unwrap_or(true)
            });
            entries.insert(key.to_owned(), CachedResponse { stored_at: now, body: body.to_owned() });

            match &self.path {
                Some(_) => serde_json::to_string(&*entries),
                None => return,
            }
        };

        // The lock is released before touching the disk.
        if let Some(path) = &self.path {
            let written = snapshot
                .context("Failed to serialize response cache")
                .and_then(|json| save_entries(path, &json));
            if let Err(e) = written {
                tracing::warn!("Failed to write response cache {}: {:#}", path.display(), e);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn load_entries(path: &Path) -> Result<HashMap<String, CachedResponse>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse cache file: {}", path.display()))
}

fn save_entries(path: &Path, json: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
    }

    fs::write(path, json).with_context(|| format!("Failed to write cache file: {}", path.display()))
}
