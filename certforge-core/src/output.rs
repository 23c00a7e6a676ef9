//! Output Document - what the certifications page loads
//!
//! Written wholesale: serialize in memory, write a temp file next to the
//! destination, rename into place.

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::config::CategoryKey;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to move temp file into place at {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: tempfile::PersistError,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputDocument {
    pub last_updated: DateTime<Utc>,
    pub total_count: usize,
    pub categories: CategoryGroups,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryGroup {
    pub display_name: String,
    pub icon: String,
    pub color: String,
    pub description: String,
    pub sort_order: i64,
    pub count: usize,
    pub certifications: Vec<CertificationEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CertificationEntry {
    pub title: String,
    pub provider: String,
    pub badge_image: String,
    pub badge_path: String,
    pub verification_url: String,
    pub fallback_svg: String,
    pub category: CategoryKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Category groups in display order; serialized as a JSON object whose key
/// order is the vector order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryGroups(Vec<(CategoryKey, CategoryGroup)>);

impl CategoryGroups {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&CategoryGroup> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, g)| g)
    }

    /// Existing group for `key`, or a new one built by `init` appended at the end.
    pub fn entry_or_insert_with(
        &mut self,
        key: &str,
        init: impl FnOnce() -> CategoryGroup,
    ) -> &mut CategoryGroup {
        let idx = match self.0.iter().position(|(k, _)| k == key) {
            Some(idx) => idx,
            None => {
                self.0.push((key.to_string(), init()));
                self.0.len() - 1
            }
        };
        &mut self.0[idx].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CategoryGroup)> {
        self.0.iter().map(|(k, g)| (k.as_str(), g))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable sort: equal sort orders keep first-appearance order.
    pub fn sort_by_order(&mut self) {
        self.0.sort_by_key(|(_, g)| g.sort_order);
    }

    pub fn groups_mut(&mut self) -> impl Iterator<Item = &mut CategoryGroup> {
        self.0.iter_mut().map(|(_, g)| g)
    }
}

impl Serialize for CategoryGroups {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, group) in &self.0 {
            map.serialize_entry(key, group)?;
        }
        map.end()
    }
}

impl OutputDocument {
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Replace `dest` with the document. On any error `dest` is left as it was.
pub fn write_document(doc: &OutputDocument, dest: &Path) -> Result<(), OutputError> {
    let json = doc.to_pretty_json()?;
    write_atomic(dest, json.as_bytes())
}

pub fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), OutputError> {
    let io_err = |source: io::Error| OutputError::Io {
        path: dest.to_path_buf(),
        source,
    };

    let dir = match dest.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(io_err)?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(bytes).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(dest).map_err(|source| OutputError::Persist {
        path: dest.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %dest.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}
