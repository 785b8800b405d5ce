//! Durable set of already-processed job IDs.
//!
//! The set is stored as a flat JSON array of strings. Every save is a full
//! snapshot written to a temp file and renamed over the old one.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::StoreError;

/// File-backed store for seen job IDs.
#[derive(Debug, Clone)]
pub struct DedupStore {
    path: PathBuf,
}

impl DedupStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the seen set.
    ///
    /// A missing file is a cold start and yields the empty set. An unreadable
    /// or corrupt file is logged and also yields the empty set.
    pub async fn load(&self) -> HashSet<String> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no dedup state yet, starting empty");
                return HashSet::new();
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to read dedup state, starting empty");
                return HashSet::new();
            }
        };

        // Older files may hold nulls for listings that had no ID
        match serde_json::from_str::<Vec<Option<String>>>(&content) {
            Ok(entries) => {
                let total = entries.len();
                let ids: HashSet<String> = entries.into_iter().flatten().collect();
                let dropped = total - ids.len();
                if dropped > 0 {
                    debug!(path = %self.path.display(), dropped, "ignored null or duplicate dedup entries");
                }
                ids
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "dedup state is not a JSON string array, starting empty");
                HashSet::new()
            }
        }
    }

    /// Sibling of the target with `.tmp` appended to the full file name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("jobs"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Overwrite the stored set with `ids`.
    pub async fn save(&self, ids: &HashSet<String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let mut sorted: Vec<&String> = ids.iter().collect();
        sorted.sort();
        let content = serde_json::to_string(&sorted)?;

        // Write to temp file first, then rename for atomicity
        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp_path, &self.path).await?;

        debug!(path = %self.path.display(), count = ids.len(), "saved dedup state");
        Ok(())
    }
}
