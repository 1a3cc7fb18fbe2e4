//! Keyword lookup orchestration
//!
//! Resolving a selection runs hash -> cache -> registry -> normalize -> cache
//! write. Every failure is folded into a [`DisplayResult`]; nothing here
//! returns an error to the host.

use crate::cache::{FileSystemCache, KeywordCache, KeywordRecord};
use crate::client::{CivitaiClient, RegistryClient};
use crate::config::KeywordsConfig;
use crate::error::{FileError, LookupError};
use crate::hasher::{FileIdentifier, hash_file, resolve_lora_path};
use crate::metrics;
use crate::normalize::{join_keywords, normalize_keywords};
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

pub const NO_KEYWORDS_TEXT: &str = "No keywords provided for this LoRA";
pub const FILE_ERROR_TEXT: &str = "Failed to read LoRA file";
pub const LOOKUP_FAILED_TEXT: &str = "Failed to fetch keywords from the registry";

/// Outcome of one lookup, as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayResult {
    /// Nothing selected
    Unselected,
    /// Normalized keywords in registry order
    Keywords(Vec<String>),
    /// Registry has no keywords for this file (possibly from a negative cache entry)
    NoKeywords,
    /// The selected file could not be read
    FileError(String),
    /// Registry could not be queried; nothing was cached
    LookupFailed(String),
}

impl DisplayResult {
    /// Text shown in the keyword box
    pub fn text(&self) -> String {
        match self {
            Self::Unselected => String::new(),
            Self::Keywords(keywords) => join_keywords(keywords),
            Self::NoKeywords => NO_KEYWORDS_TEXT.to_string(),
            Self::FileError(_) => FILE_ERROR_TEXT.to_string(),
            Self::LookupFailed(_) => LOOKUP_FAILED_TEXT.to_string(),
        }
    }

    /// Stable outcome label for logs, metrics and API responses
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Unselected => "unselected",
            Self::Keywords(_) => "keywords",
            Self::NoKeywords => "no_keywords",
            Self::FileError(_) => "file_error",
            Self::LookupFailed(_) => "lookup_failed",
        }
    }

    pub fn keywords(&self) -> &[String] {
        match self {
            Self::Keywords(keywords) => keywords,
            _ => &[],
        }
    }

    fn from_record(record: KeywordRecord) -> Self {
        if record.is_negative() {
            Self::NoKeywords
        } else {
            Self::Keywords(record.keywords)
        }
    }
}

type InflightMap = DashMap<FileIdentifier, Arc<Mutex<()>>>;

/// Shared lock for one identifier; the map entry goes away with its last holder,
/// including when the lookup future is dropped mid-flight
struct InflightSlot<'a> {
    map: &'a InflightMap,
    identifier: &'a FileIdentifier,
    lock: Option<Arc<Mutex<()>>>,
}

impl<'a> InflightSlot<'a> {
    fn acquire(map: &'a InflightMap, identifier: &'a FileIdentifier) -> Self {
        let lock = map.entry(identifier.clone()).or_default().clone();
        Self {
            map,
            identifier,
            lock: Some(lock),
        }
    }

    fn lock(&self) -> &Mutex<()> {
        // Only taken in drop
        self.lock.as_deref().unwrap_or_else(|| unreachable!())
    }
}

impl Drop for InflightSlot<'_> {
    fn drop(&mut self) {
        drop(self.lock.take());
        self.map
            .remove_if(self.identifier, |_, lock| Arc::strong_count(lock) == 1);
    }
}

/// Resolves keywords for LoRA files under one directory
pub struct KeywordResolver {
    lora_dir: PathBuf,
    cache: Arc<dyn KeywordCache>,
    client: Arc<dyn RegistryClient>,
    /// Per-identifier locks so concurrent misses share one registry fetch
    inflight: InflightMap,
}

impl KeywordResolver {
    /// Create a resolver with explicit collaborators
    pub fn new(
        lora_dir: PathBuf,
        cache: Arc<dyn KeywordCache>,
        client: Arc<dyn RegistryClient>,
    ) -> Self {
        Self {
            lora_dir,
            cache,
            client,
            inflight: DashMap::new(),
        }
    }

    /// Create a resolver with the filesystem cache and HTTP registry client
    pub fn from_config(config: &KeywordsConfig) -> anyhow::Result<Self> {
        let client = CivitaiClient::new(&config.registry_url, config.request_timeout())?;
        Ok(Self::new(
            config.lora_dir.clone(),
            Arc::new(FileSystemCache::new(config.cache_dir.clone())),
            Arc::new(client),
        ))
    }

    /// Resolve keywords for a selected file, relative to the LoRA directory
    pub async fn resolve(&self, selection: &str) -> DisplayResult {
        let result = self.resolve_inner(selection).await;
        metrics::record_lookup(result.outcome());
        result
    }

    async fn resolve_inner(&self, selection: &str) -> DisplayResult {
        if selection.trim().is_empty() {
            return DisplayResult::Unselected;
        }

        let identifier = match self.identify(selection).await {
            Ok(identifier) => identifier,
            Err(e) => {
                tracing::warn!(file = %selection, error = %e, "Cannot read selected LoRA");
                return DisplayResult::FileError(e.to_string());
            }
        };

        tracing::info!(file = %selection, identifier = %identifier, "Selected LoRA hashed");

        if let Some(record) = self.cached(&identifier).await {
            return DisplayResult::from_record(record);
        }
        metrics::record_cache_miss();

        let slot = InflightSlot::acquire(&self.inflight, &identifier);
        let _guard = slot.lock().lock().await;
        // Another lookup may have filled the cache while we waited
        match self.cached(&identifier).await {
            Some(record) => DisplayResult::from_record(record),
            None => self.fetch_and_store(selection, &identifier).await,
        }
    }

    async fn identify(&self, selection: &str) -> Result<FileIdentifier, FileError> {
        let path = resolve_lora_path(&self.lora_dir, selection).await?;
        hash_file(&path).await
    }

    async fn cached(&self, identifier: &FileIdentifier) -> Option<KeywordRecord> {
        let record = self.cache.get(identifier).await?;
        tracing::debug!(
            identifier = %identifier,
            keywords = record.keywords.len(),
            "Cache hit"
        );
        metrics::record_cache_hit(record.is_negative());
        Some(record)
    }

    async fn fetch_and_store(&self, selection: &str, identifier: &FileIdentifier) -> DisplayResult {
        let keywords = match self.client.fetch(identifier).await {
            Ok(raw) => {
                metrics::record_registry_request("ok");
                normalize_keywords(&raw)
            }
            Err(LookupError::NotFound) => {
                metrics::record_registry_request("not_found");
                tracing::info!(file = %selection, identifier = %identifier, "Registry has no entry");
                Vec::new()
            }
            Err(e) => {
                metrics::record_registry_request("failed");
                tracing::warn!(
                    file = %selection,
                    identifier = %identifier,
                    error = %e,
                    "Registry lookup failed"
                );
                return DisplayResult::LookupFailed(e.to_string());
            }
        };

        tracing::info!(
            file = %selection,
            identifier = %identifier,
            count = keywords.len(),
            "Fetched keywords"
        );

        if let Err(e) = self.cache.put(identifier, &keywords).await {
            metrics::record_cache_write_failure();
            tracing::warn!(identifier = %identifier, error = %e, "Failed to cache keywords");
        }

        if keywords.is_empty() {
            DisplayResult::NoKeywords
        } else {
            DisplayResult::Keywords(keywords)
        }
    }
}
