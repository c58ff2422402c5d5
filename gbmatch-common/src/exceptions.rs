//! Curated exception registry
//!
//! Operators list specimens whose disagreement has been reviewed and accepted.
//! Each entry is tied to the consensus name at the time it was written: once
//! the community name changes, the entry stops applying and the specimen is
//! compared normally again.
//!
//! File format (TOML):
//! ```toml
//! [[exception]]
//! id = 232615678
//! expected = "Amanita"
//! ```

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// One reviewed specimen and the consensus name it was reviewed under
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExceptionEntry {
    pub id: u64,
    pub expected: String,
}

#[derive(Debug, Deserialize)]
struct ExceptionFile {
    #[serde(default, rename = "exception")]
    exceptions: Vec<ExceptionEntry>,
}

/// Immutable id -> expected consensus name table
#[derive(Debug, Clone, Default)]
pub struct ExceptionRegistry {
    entries: HashMap<u64, String>,
}

impl ExceptionRegistry {
    /// Empty registry (no suppressions)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries; a repeated id is rejected
    pub fn new(entries: impl IntoIterator<Item = ExceptionEntry>) -> Result<Self> {
        let mut map = HashMap::new();
        for entry in entries {
            if map.insert(entry.id, entry.expected).is_some() {
                return Err(Error::Config(format!(
                    "Duplicate exception for specimen {}",
                    entry.id
                )));
            }
        }
        Ok(Self { entries: map })
    }

    /// Parse a TOML exception table
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ExceptionFile = toml::from_str(content)
            .map_err(|e| Error::Parse(format!("Invalid exception table: {}", e)))?;
        Self::new(file.exceptions)
    }

    /// Load a TOML exception table from disk
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Read exception table {} failed: {}", path.display(), e))
        })?;
        let registry = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            count = registry.len(),
            "Loaded exception table"
        );
        Ok(registry)
    }

    /// True only if `id` is registered under exactly this consensus name
    ///
    /// The comparison is case-sensitive and unnormalized.
    pub fn is_excepted(&self, id: u64, current_consensus_name: &str) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|expected| expected == current_consensus_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
