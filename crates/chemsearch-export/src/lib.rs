//! Export pipeline for search results.
//!
//! This crate turns result rows into downloadable artifacts:
//! - [`csv`]: row serialization into the CSV dialect served to clients
//! - [`packager`]: single-CSV and zip-archive packaging
//! - [`transient`]: request-scoped temporary files with guaranteed cleanup

pub mod csv;
mod error;
pub mod packager;
pub mod transient;

pub use crate::csv::{CsvArtifact, CsvSerializer, escape_newlines, value_to_text};
pub use error::{ExportError, Result};
pub use packager::{ArtifactEntry, ArtifactKind, ExportArtifact, ExportLayout, ExportPackager};
pub use transient::{TransientFile, TransientStore};
