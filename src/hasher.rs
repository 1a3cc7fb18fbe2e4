//! Content hashing for LoRA files
//!
//! A file is identified by the SHA-256 of its bytes, hex-encoded in lowercase.
//! The registry indexes model versions by the same digest.

use crate::error::FileError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 64 * 1024;

/// Lowercase hex SHA-256 digest of a file's contents
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileIdentifier(String);

impl FileIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }
}

impl std::fmt::Display for FileIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash an in-memory buffer
pub fn hash_bytes(bytes: &[u8]) -> FileIdentifier {
    FileIdentifier::from_digest(&Sha256::digest(bytes))
}

/// Hash a file by streaming its full contents
pub async fn hash_file(path: &Path) -> Result<FileIdentifier, FileError> {
    let io_err = |source| FileError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = tokio::fs::File::open(path).await.map_err(io_err)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = file.read(&mut buf).await.map_err(io_err)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    Ok(FileIdentifier::from_digest(&hasher.finalize()))
}

/// Resolve a selection against the LoRA directory
///
/// Confinement is lexical: the selection may not climb out of `root` with `..`
/// and an absolute selection must sit under `root`. Symlinks inside the
/// directory are followed, so linked model folders resolve like the listing
/// shows them. The target must be a regular file.
pub async fn resolve_lora_path(root: &Path, selection: &str) -> Result<PathBuf, FileError> {
    let selected = Path::new(selection);
    let outside = || FileError::OutsideRoot {
        path: selected.to_path_buf(),
    };

    let relative = if selected.is_absolute() {
        match selected.strip_prefix(root) {
            Ok(relative) => relative.to_path_buf(),
            Err(_) => {
                let root_canon = tokio::fs::canonicalize(root).await.map_err(|source| {
                    FileError::Io {
                        path: root.to_path_buf(),
                        source,
                    }
                })?;
                selected
                    .strip_prefix(&root_canon)
                    .map_err(|_| outside())?
                    .to_path_buf()
            }
        }
    } else {
        selected.to_path_buf()
    };

    if !relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(outside());
    }

    let candidate = root.join(&relative);
    let metadata = tokio::fs::metadata(&candidate)
        .await
        .map_err(|source| FileError::Io {
            path: candidate.clone(),
            source,
        })?;
    if !metadata.is_file() {
        return Err(FileError::NotAFile { path: candidate });
    }

    Ok(candidate)
}
