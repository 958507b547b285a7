use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur while exporting results.
#[derive(Debug, Error)]
pub enum ExportError {
    /// A single-collection export matched no rows.
    #[error("Nothing to export for '{collection}'")]
    EmptyExport { collection: String },

    /// Rows could not be written as CSV (for example a record whose fields
    /// differ from the header).
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Transient storage could not be written, read or deleted.
    #[error("File system error at {}: {source}", .path.display())]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub fn empty_export(collection: impl Into<String>) -> Self {
        Self::EmptyExport {
            collection: collection.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    pub fn file_system(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::FileSystem {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Check if this error is the caller-visible "nothing matched" condition
    pub fn is_empty_export(&self) -> bool {
        matches!(self, Self::EmptyExport { .. })
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
