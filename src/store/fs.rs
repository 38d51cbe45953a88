//! File-backed record store.
//!
//! Layout of the data directory:
//! ```text
//! <data_dir>/index.json      {"12345": {...}, "67890": {...}}
//! <data_dir>/12345.json      AuthorityRecord
//! <data_dir>/67890.json      AuthorityRecord
//! ```
//!
//! Records are read on demand and, when caching is enabled, kept in a
//! concurrent map for the lifetime of the store.

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{is_naan_key, AuthorityRecord, RecordStore, StoreError};

const INDEX_FILE: &str = "index.json";

/// Record store reading one JSON file per NAAN.
#[derive(Debug, Clone)]
pub struct FileRecordStore {
    data_dir: PathBuf,
    cache: Option<Arc<DashMap<String, AuthorityRecord>>>,
}

impl FileRecordStore {
    /// Create a store rooted at `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>, cache_records: bool) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: cache_records.then(|| Arc::new(DashMap::new())),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Number of records currently cached.
    pub fn cached(&self) -> usize {
        self.cache.as_ref().map(|c| c.len()).unwrap_or(0)
    }

    fn record_path(&self, naan: &str) -> PathBuf {
        self.data_dir.join(format!("{naan}.json"))
    }

    async fn read_record(&self, naan: &str) -> Result<Option<AuthorityRecord>, StoreError> {
        let path = self.record_path(naan);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let record: AuthorityRecord =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        record.check().map_err(|reason| StoreError::InvalidRecord {
            naan: naan.to_string(),
            reason,
        })?;

        Ok(Some(record))
    }

    async fn scan_dir(&self) -> Result<Vec<String>, StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.data_dir.display().to_string(),
            source,
        };
        let mut entries = tokio::fs::read_dir(&self.data_dir).await.map_err(io_err)?;
        let mut naans = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(".json")) else {
                continue;
            };
            if is_naan_key(stem) {
                naans.push(stem.to_string());
            }
        }
        naans.sort();
        Ok(naans)
    }
}

#[async_trait]
impl RecordStore for FileRecordStore {
    async fn get(&self, naan: &str) -> Result<Option<AuthorityRecord>, StoreError> {
        // Only digit keys map to files; anything else cannot be a NAAN.
        if !is_naan_key(naan) {
            return Ok(None);
        }

        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(naan) {
                return Ok(Some(hit.value().clone()));
            }
        }

        let record = self.read_record(naan).await?;
        if let (Some(cache), Some(record)) = (&self.cache, &record) {
            cache.insert(naan.to_string(), record.clone());
            tracing::debug!(naan = %naan, cached = cache.len(), "Cached authority record");
        }
        Ok(record)
    }

    async fn naans(&self) -> Result<Vec<String>, StoreError> {
        let path = self.data_dir.join(INDEX_FILE);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Index missing, scanning data directory");
                return self.scan_dir().await;
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let index: Map<String, Value> =
            serde_json::from_str(&content).map_err(|source| StoreError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Ok(index.keys().cloned().collect())
    }
}
