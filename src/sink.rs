// Persistence sinks for downloaded reports and summaries.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::info;

use crate::error::PersistenceError;

/// Somewhere to put named byte blobs.
pub trait ReportSink {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PersistenceError>;
}

/// Writes each blob to `dir/name`, creating `dir` on first use.
#[derive(Debug, Clone)]
pub struct DirSink {
    dir: PathBuf,
}

impl DirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DirSink {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistenceError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|source| PersistenceError::Io {
            path: path.clone(),
            source,
        })?;
        info!(path = %path.display(), bytes = bytes.len(), "stored report");
        Ok(())
    }
}

/// Keeps blobs in memory; for dry runs and tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemorySink {
    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Stored names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl ReportSink for MemorySink {
    fn store(&self, name: &str, bytes: &[u8]) -> Result<(), PersistenceError> {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
