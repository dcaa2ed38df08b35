//! Locally persisted priority marks
//!
//! The set is stored as a JSON array of control ids. A missing file reads
//! as an empty set; writes go through a sibling temp file and a rename.

use crate::error::Result;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed priority set
#[derive(Debug, Clone)]
pub struct PriorityStore {
    path: PathBuf,
}

impl PriorityStore {
    /// Store at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored set
    ///
    /// # Errors
    /// - `EngineError::Io` if the file exists but cannot be read
    /// - `EngineError::Json` if it is not a JSON array of strings
    pub fn load(&self) -> Result<BTreeSet<String>> {
        match fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeSet::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no stored priorities");
                Ok(BTreeSet::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Replace the stored set
    ///
    /// # Errors
    /// - `EngineError::Io` on any filesystem failure
    pub fn save(&self, priorities: &BTreeSet<String>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let body = serde_json::to_vec_pretty(priorities)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), count = priorities.len(), "saved priorities");
        Ok(())
    }
}
