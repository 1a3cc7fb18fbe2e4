//! LoRA file discovery
//!
//! Lists candidate files under the LoRA directory as `/`-separated relative
//! paths. Root-level files come first; everything is ordered case-insensitively,
//! subdirectory entries by their path segments.

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// List LoRA files with one of `extensions` (matched case-insensitively)
pub fn list_lora_files(dir: &Path, extensions: &[String], recursive: bool) -> Result<Vec<String>> {
    let max_depth = if recursive { usize::MAX } else { 1 };
    let extensions: Vec<String> = extensions.iter().map(|e| e.to_lowercase()).collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(max_depth).follow_links(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to read LoRA directory {:?}", dir));
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_lowercase();
        if !extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let segments: Vec<String> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        files.push(segments);
    }

    files.sort_by_cached_key(|segments| {
        (
            segments.len() > 1,
            segments.iter().map(|s| s.to_lowercase()).collect::<Vec<_>>(),
            segments.clone(),
        )
    });

    Ok(files.into_iter().map(|segments| segments.join("/")).collect())
}
