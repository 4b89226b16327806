//! Persisted raw-table artifacts, one markdown file per document id.
//!
//! The store is an inspectable cache/log, not a database: artifacts live at
//! a stable path, are overwritten on re-extraction, and stay on disk after
//! the batch so a human can audit what the model actually emitted.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::StoreError;

#[derive(Debug, Clone)]
pub struct TableStore {
    root: PathBuf,
}

impl TableStore {
    /// Open (and create if needed) a table store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Stable artifact path for a document id: `<root>/data_<id>.md`.
    pub fn path_for(&self, data_id: &str) -> PathBuf {
        self.root.join(format!("data_{data_id}.md"))
    }

    /// Persist raw table markdown, overwriting any prior artifact.
    pub fn save(&self, data_id: &str, raw_markdown: &str) -> Result<(), StoreError> {
        let path = self.path_for(data_id);
        debug!(path = %path.display(), bytes = raw_markdown.len(), "saving table artifact");
        fs::write(&path, raw_markdown)?;
        Ok(())
    }

    /// Read back a persisted artifact.
    pub fn load(&self, data_id: &str) -> Result<String, StoreError> {
        let path = self.path_for(data_id);
        if !path.exists() {
            return Err(StoreError::NotFound(path));
        }
        Ok(fs::read_to_string(&path)?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}
