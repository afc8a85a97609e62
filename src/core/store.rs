use crate::core::models::{FreshnessRecord, RequestLog, RequestLogEntry, SourceId};
use crate::core::settings::{StorageBackend, StorageSettings};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

pub const REQUEST_LOG_KEY: &str = "requestLog";

/// Durable storage for one freshness record per source plus the request log.
///
/// `write` replaces payload and timestamp together, so a reader never sees
/// a payload from one fetch paired with the timestamp of another.
pub trait CacheStore: Send + Sync {
    fn read(&self, source: SourceId) -> Result<Option<FreshnessRecord>>;
    fn write(
        &self,
        source: SourceId,
        payload: &serde_json::Value,
        fetched_at: DateTime<Utc>,
    ) -> Result<()>;
    fn append_log(&self, entry: RequestLogEntry, capacity: usize) -> Result<()>;
    fn request_log(&self) -> Result<RequestLog>;
}

/// One JSON file per key under the cache directory. Writes go to a
/// temporary file first and are moved into place with a rename.
pub struct FileCacheStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl FileCacheStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.key_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", path.display()))?;

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", path.display()))?;

        Ok(Some(value))
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let path = self.key_path(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        let contents = serde_json::to_string_pretty(value)?;

        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write cache file: {}", tmp.display()))?;
        std::fs::rename(&tmp, &path)
            .with_context(|| format!("Failed to replace cache file: {}", path.display()))?;
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for FileCacheStore {
    fn read(&self, source: SourceId) -> Result<Option<FreshnessRecord>> {
        self.load(source.storage_key())
    }

    fn write(
        &self,
        source: SourceId,
        payload: &serde_json::Value,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        let record = FreshnessRecord {
            last_fetched_at: fetched_at,
            payload: payload.clone(),
        };
        let _guard = self.lock();
        self.save(source.storage_key(), &record)?;
        tracing::debug!(%source, path = %self.key_path(source.storage_key()).display(), "Wrote cache record");
        Ok(())
    }

    fn append_log(&self, entry: RequestLogEntry, capacity: usize) -> Result<()> {
        let _guard = self.lock();
        let mut log: RequestLog = match self.load(REQUEST_LOG_KEY) {
            Ok(log) => log.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Request log unreadable, starting a new one");
                RequestLog::new()
            }
        };
        log.push(entry, capacity);
        self.save(REQUEST_LOG_KEY, &log)
    }

    fn request_log(&self) -> Result<RequestLog> {
        Ok(self.load(REQUEST_LOG_KEY)?.unwrap_or_default())
    }
}

#[derive(Default)]
struct MemoryInner {
    records: HashMap<SourceId, FreshnessRecord>,
    log: RequestLog,
}

/// Process-lifetime store, used when persistence is turned off.
#[derive(Default)]
pub struct MemoryCacheStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn inner(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CacheStore for MemoryCacheStore {
    fn read(&self, source: SourceId) -> Result<Option<FreshnessRecord>> {
        Ok(self.inner().records.get(&source).cloned())
    }

    fn write(
        &self,
        source: SourceId,
        payload: &serde_json::Value,
        fetched_at: DateTime<Utc>,
    ) -> Result<()> {
        self.inner().records.insert(
            source,
            FreshnessRecord {
                last_fetched_at: fetched_at,
                payload: payload.clone(),
            },
        );
        Ok(())
    }

    fn append_log(&self, entry: RequestLogEntry, capacity: usize) -> Result<()> {
        self.inner().log.push(entry, capacity);
        Ok(())
    }

    fn request_log(&self) -> Result<RequestLog> {
        Ok(self.inner().log.clone())
    }
}

pub fn open_store(settings: &StorageSettings) -> Result<Arc<dyn CacheStore>> {
    match settings.backend {
        StorageBackend::File => {
            let store = FileCacheStore::new(settings.resolve_dir()?)?;
            tracing::debug!(dir = %store.dir().display(), "Using file cache store");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            tracing::info!("Using in-memory cache store, nothing survives a restart");
            Ok(Arc::new(MemoryCacheStore::new()))
        }
    }
}
