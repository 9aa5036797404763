//! Assignee directory
//!
//! Static mapping from runner service name to the person owning it. A family
//! `X` is owned by the entry whose service is `Insights<X>_runner`.

use crate::error::DirectoryError;
use failwatch_core::FamilyKey;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssigneeEntry {
    /// Runner service name
    pub service: String,
    /// Owner's user name, without domain
    pub assignee: String,
}

/// Family owner lookup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssigneeDirectory {
    entries: Vec<AssigneeEntry>,
}

impl AssigneeDirectory {
    /// Create directory from entries
    #[inline]
    #[must_use]
    pub fn new(entries: Vec<AssigneeEntry>) -> Self {
        Self { entries }
    }

    /// Load a JSON array of entries from disk
    ///
    /// # Errors
    /// Returns `DirectoryError` if the file cannot be read or parsed
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DirectoryError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DirectoryError::io_error(path, e))?;
        let entries: Vec<AssigneeEntry> =
            serde_json::from_str(&raw).map_err(|e| DirectoryError::json_error(path, e))?;

        tracing::debug!("Loaded {} assignee entries from {}", entries.len(), path.display());
        Ok(Self::new(entries))
    }

    /// Runner service name for a family
    #[inline]
    #[must_use]
    pub fn service_name(family: &FamilyKey) -> String {
        format!("Insights{family}_runner")
    }

    /// Owner of a family; first matching entry wins
    #[must_use]
    pub fn lookup(&self, family: &FamilyKey) -> Option<&str> {
        let service = Self::service_name(family);
        self.entries
            .iter()
            .find(|entry| entry.service == service)
            .map(|entry| entry.assignee.as_str())
    }

    /// Number of entries
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if directory is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
