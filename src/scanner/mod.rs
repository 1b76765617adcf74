//! Input discovery for directory conversions.
//!
//! Walks a directory tree and collects AGS files, skipping hidden entries.

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Extension of AGS files, compared case-insensitively.
pub const AGS_EXTENSION: &str = "ags";

/// File scanner for discovering AGS files.
pub struct AgsScanner {
    root: PathBuf,
}

impl AgsScanner {
    /// Create a new scanner rooted at `root`.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Scan for all AGS files, sorted by path.
    pub fn scan(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(anyhow::anyhow!(
                "Not a directory: {}",
                self.root.display()
            ));
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if entry.file_type().is_file() && is_ags(entry.path()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        debug!("Found {} AGS files under {}", files.len(), self.root.display());
        Ok(files)
    }
}

/// Check whether a path has the `.ags` extension.
pub fn is_ags(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(AGS_EXTENSION))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
