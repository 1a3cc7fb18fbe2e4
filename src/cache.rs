//! Local keyword cache
//!
//! One JSON file per identifier:
//! ```text
//! <cache_dir>/
//! ├── 3b1f...e0a2.json   ["1girl, solo", "ink style"]
//! └── 9c44...71bd.json   []
//! ```
//! An empty array is a negative entry: the registry was asked and had nothing.

use crate::error::CacheError;
use crate::hasher::FileIdentifier;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Resolved keywords for one file identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRecord {
    pub identifier: FileIdentifier,
    pub keywords: Vec<String>,
}

impl KeywordRecord {
    /// Negative entry: queried, nothing known
    pub fn is_negative(&self) -> bool {
        self.keywords.is_empty()
    }
}

// ============================================================================
// Trait Definitions
// ============================================================================

/// Keyword cache backend
#[async_trait]
pub trait KeywordCache: Send + Sync {
    /// Look up a record. Unreadable or malformed records read as a miss.
    async fn get(&self, identifier: &FileIdentifier) -> Option<KeywordRecord>;

    /// Store a record, replacing any previous one
    async fn put(&self, identifier: &FileIdentifier, keywords: &[String]) -> Result<(), CacheError>;
}

// ============================================================================
// Production Implementation
// ============================================================================

/// Cache backed by a directory of `<identifier>.json` files
pub struct FileSystemCache {
    dir: PathBuf,
}

impl FileSystemCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the record file for an identifier
    pub fn record_path(&self, identifier: &FileIdentifier) -> PathBuf {
        self.dir.join(format!("{}.json", identifier))
    }

    async fn read_record(&self, identifier: &FileIdentifier) -> Result<Option<Vec<String>>, CacheError> {
        let path = self.record_path(identifier);

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(CacheError::Io { path, source }),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| CacheError::Malformed { path, source })
    }
}

#[async_trait]
impl KeywordCache for FileSystemCache {
    async fn get(&self, identifier: &FileIdentifier) -> Option<KeywordRecord> {
        match self.read_record(identifier).await {
            Ok(Some(keywords)) => Some(KeywordRecord {
                identifier: identifier.clone(),
                keywords,
            }),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(
                    identifier = %identifier,
                    error = %e,
                    "Ignoring unreadable cache record"
                );
                None
            }
        }
    }

    async fn put(&self, identifier: &FileIdentifier, keywords: &[String]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(io_err(&self.dir))?;

        let path = self.record_path(identifier);
        let content = serde_json::to_string(keywords).map_err(|source| CacheError::Malformed {
            path: path.clone(),
            source,
        })?;

        // Atomic write: unique temp file, then rename. Concurrent writers of the
        // same identifier each rename a complete file.
        let temp_file = self.dir.join(format!(
            "{}.{}-{}.tmp",
            identifier,
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));

        let mut file = fs::File::create(&temp_file)
            .await
            .map_err(io_err(&temp_file))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(io_err(&temp_file))?;
        file.sync_all().await.map_err(io_err(&temp_file))?;
        drop(file);

        if let Err(source) = fs::rename(&temp_file, &path).await {
            let _ = fs::remove_file(&temp_file).await;
            return Err(CacheError::Io { path, source });
        }

        tracing::debug!(
            identifier = %identifier,
            keywords = keywords.len(),
            "Cache record written"
        );

        Ok(())
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> CacheError + use<> {
    let path = path.to_path_buf();
    move |source| CacheError::Io { path, source }
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================
