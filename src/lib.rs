//! LoRA Keywords - trained-word lookup for local LoRA files
//!
//! Hashes a selected LoRA file, looks its SHA-256 up in a model registry, and
//! caches the resulting keywords (including "none known") on disk.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod hasher;
pub mod listing;
pub mod lookup;
pub mod metrics;
pub mod normalize;
pub mod presenter;

pub use cache::{FileSystemCache, KeywordCache, KeywordRecord};
pub use client::{CivitaiClient, RegistryClient};
pub use config::KeywordsConfig;
pub use error::{CacheError, FileError, LookupError};
pub use hasher::{FileIdentifier, hash_bytes, hash_file};
pub use listing::list_lora_files;
pub use lookup::{DisplayResult, KeywordResolver};
pub use normalize::normalize_keyword;
pub use presenter::{Presenter, PromptBuffer, PromptSink};
