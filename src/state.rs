//! Processed-set persistence
//!
//! The processed-set is the list of filenames the batch editor has already
//! transformed. It is stored as a JSON array of strings and rewritten after
//! every successful edit, so a run that is interrupted keeps everything that
//! finished before the interruption.

use std::collections::HashSet;
use std::io::Write;
use std::path::Path;
use tracing::debug;

use crate::error::{Result, ReelbatchError};

#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    entries: Vec<String>,
    index: HashSet<String>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the set from disk; a missing file yields an empty set
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No processed-set at {}, starting empty", path.display());
                return Ok(Self::new());
            }
            Err(e) => return Err(ReelbatchError::Io(e)),
        };

        let names: Vec<String> = serde_json::from_str(&content).map_err(|e| ReelbatchError::MalformedState {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let mut set = Self::new();
        for name in names {
            set.index.insert(name.clone());
            set.entries.push(name);
        }

        debug!("Loaded {} processed entries from {}", set.len(), path.display());
        Ok(set)
    }

    /// Overwrite `path` with the full set
    ///
    /// The JSON is written to a sibling temporary file which then replaces the
    /// target, so the previous content survives a crash during the write.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let content = serde_json::to_string(&self.entries)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| ReelbatchError::Io(e.error))?;

        debug!("Saved {} processed entries to {}", self.len(), path.display());
        Ok(())
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.index.contains(filename)
    }

    /// Append `filename` unless present; returns true when it was added
    pub fn add<S: Into<String>>(&mut self, filename: S) -> bool {
        let filename = filename.into();
        if self.index.contains(&filename) {
            return false;
        }
        self.index.insert(filename.clone());
        self.entries.push(filename);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|s| s.as_str())
    }
}
