//! Reading and writing the files coursebook works on.
//!
//! Two kinds of file are involved:
//!
//! ```text
//! README.md              # The progress document, rewritten in full
//! <course>/status.json   # One status record per course, read only
//! ```
//!
//! The document is read once and written at most once per run. Nothing is
//! written when the text didn't change.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::model::StatusRecord;

/// Errors that can occur reading or writing files.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("could not read document {}: {source}", path.display())]
    DocumentUnreadable { path: PathBuf, source: io::Error },

    #[error("could not write document {}: {source}", path.display())]
    DocumentUnwritable { path: PathBuf, source: io::Error },

    #[error("could not read status file {}: {source}", path.display())]
    RecordUnreadable { path: PathBuf, source: io::Error },

    #[error("malformed status file {}: {source}", path.display())]
    MalformedRecord {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl StorageError {
    /// Whether this failure should end the run.
    ///
    /// Only document I/O is fatal; a bad status file affects one course.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::DocumentUnreadable { .. } | Self::DocumentUnwritable { .. }
        )
    }
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Read the whole document.
pub fn read_document(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| StorageError::DocumentUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Replace the document's contents.
pub fn write_document(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).map_err(|source| StorageError::DocumentUnwritable {
        path: path.to_path_buf(),
        source,
    })
}

/// Load and parse a status record.
///
/// The file must hold a JSON object; arrays and scalars are malformed.
pub fn load_record(path: &Path) -> Result<StatusRecord> {
    let json = fs::read_to_string(path).map_err(|source| StorageError::RecordUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let malformed = |source: serde_json::Error| StorageError::MalformedRecord {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_json::Value = serde_json::from_str(&json).map_err(malformed)?;
    if !value.is_object() {
        return Err(malformed(<serde_json::Error as serde::de::Error>::custom(
            "status record must be a JSON object",
        )));
    }
    serde_json::from_value(value).map_err(malformed)
}
