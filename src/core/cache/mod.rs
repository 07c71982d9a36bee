//! Local reference-data cache
//!
//! A single JSON document holding the API key, the viewer id, the four
//! reference collections and their derived indexes. Every write is a
//! full-document read-modify-write followed by an atomic replace, so a reader
//! never sees a half-written file.
//!
//! There is no locking: two invocations saving at the same time race, and the
//! last writer wins. The tool assumes one user running one command at a time.

mod sync;
mod types;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde_json::Value;
use thiserror::Error;

use crate::core::config::Settings;

pub use sync::{AvatarFetchError, Category, SyncError, SyncReport, SyncScope, Synchronizer, PAGE_SIZE};
pub use types::{
    index_projects, index_states, CacheDocument, Project, StatesByTeam, Team, TeamsToProjects,
    User, WorkflowState,
};

/// Errors reading or writing the cache document
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("Failed to access {}: {source}", path.display())]
    #[diagnostic(code(lincli::cache::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache document {} is unreadable: {message}", path.display())]
    #[diagnostic(
        code(lincli::cache::corrupt),
        help("delete the file and run `linear init <apikey>` to rebuild it")
    )]
    Corrupt { path: PathBuf, message: String },

    #[error("Cannot set '{key}': {message}")]
    #[diagnostic(code(lincli::cache::invalid_value))]
    InvalidValue { key: String, message: String },
}

/// The on-disk cache document and where it lives
#[derive(Debug)]
pub struct ReferenceCache {
    path: PathBuf,
    document: CacheDocument,
}

impl ReferenceCache {
    /// Open the cache at the settings' data path
    pub fn open(settings: &Settings) -> Result<Self, StoreError> {
        Self::open_at(&settings.data_path())
    }

    /// Open the cache at an explicit path
    ///
    /// A missing file yields an empty document; it is created on first save.
    pub fn open_at(path: &Path) -> Result<Self, StoreError> {
        let document = if path.exists() {
            let contents = fs::read_to_string(path).map_err(|source| StoreError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            if contents.trim().is_empty() {
                CacheDocument::default()
            } else {
                serde_json::from_str(&contents).map_err(|e| StoreError::Corrupt {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?
            }
        } else {
            CacheDocument::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> &CacheDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut CacheDocument {
        &mut self.document
    }

    /// Write the document atomically (temp file in the same directory, then rename)
    pub fn save(&self) -> Result<(), StoreError> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        fs::create_dir_all(dir).map_err(io_err)?;

        let json = serde_json::to_string_pretty(&self.document).map_err(|e| StoreError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        temp.write_all(json.as_bytes()).map_err(io_err)?;
        temp.write_all(b"\n").map_err(io_err)?;
        temp.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::debug!(path = %self.path.display(), "cache saved");
        Ok(())
    }

    /// Set an arbitrary top-level key to a string value and save
    ///
    /// Any key is accepted. Keys the document knows about must still decode
    /// into their typed field (so `teams` cannot be set to a string); unknown
    /// keys are stored as-is and never read back by the tool.
    pub fn set_field(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let invalid = |message: String| StoreError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut raw = serde_json::to_value(&self.document).map_err(|e| invalid(e.to_string()))?;
        let map = raw
            .as_object_mut()
            .ok_or_else(|| invalid("cache document is not an object".to_string()))?;
        map.insert(key.to_string(), Value::String(value.to_string()));

        let updated: CacheDocument = serde_json::from_value(raw).map_err(|e| invalid(e.to_string()))?;
        self.document = updated;
        self.save()
    }
}
