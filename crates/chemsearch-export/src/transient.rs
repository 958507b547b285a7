//! Request-scoped temporary files.
//!
//! Every export artifact lives in a [`TransientFile`] under a shared root.
//! Names are `<hint>-<uuid>.<ext>` and files are created with `create_new`,
//! so concurrent requests never collide and no directory locking is needed.
//! A handle deletes its file when released or dropped; deletion failures are
//! logged and never surfaced.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::{ExportError, Result};

/// Allocator for transient files under a single root directory.
#[derive(Debug, Clone)]
pub struct TransientStore {
    root: PathBuf,
}

impl TransientStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ExportError::file_system(&self.root, e))
    }

    /// Build a unique path for `hint` without touching the filesystem.
    pub fn allocate(&self, hint: &str, extension: &str) -> PathBuf {
        let filename = format!("{}-{}.{}", sanitize_hint(hint), Uuid::new_v4(), extension);
        self.root.join(filename)
    }

    /// Atomically create a new empty file and return its guard with an open
    /// handle for writing.
    pub async fn create(&self, hint: &str, extension: &str) -> Result<(TransientFile, File)> {
        let path = self.allocate(hint, extension);
        let file = OpenOptions::new()
            .write(true)
            .read(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| ExportError::file_system(&path, e))?;
        Ok((TransientFile::new(path), file))
    }

    /// Create a new file holding `bytes`.
    ///
    /// On a failed write the partially written file is removed before the
    /// error is returned.
    pub async fn materialize(
        &self,
        hint: &str,
        extension: &str,
        bytes: &[u8],
    ) -> Result<TransientFile> {
        let (guard, mut file) = self.create(hint, extension).await?;
        let written = async {
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await
        }
        .await;
        drop(file);
        if let Err(e) = written {
            let err = ExportError::file_system(guard.path(), e);
            guard.release().await;
            return Err(err);
        }
        Ok(guard)
    }
}

/// Keep only characters that are safe in a file name.
fn sanitize_hint(hint: &str) -> String {
    let cleaned: String = hint
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "export".to_string()
    } else {
        cleaned
    }
}

/// Guard that owns one transient file and deletes it exactly once.
#[derive(Debug)]
pub struct TransientFile {
    path: PathBuf,
    armed: bool,
}

impl TransientFile {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now.
    pub async fn release(mut self) {
        self.armed = false;
        match fs::remove_file(&self.path).await {
            Ok(()) => tracing::debug!(path = %self.path.display(), "transient file released"),
            Err(e) => log_cleanup_failure(&self.path, &e),
        }
    }
}

impl Drop for TransientFile {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "transient file dropped"),
            Err(e) => log_cleanup_failure(&self.path, &e),
        }
    }
}

fn log_cleanup_failure(path: &Path, err: &std::io::Error) {
    if err.kind() == std::io::ErrorKind::NotFound {
        return;
    }
    tracing::warn!(
        path = %path.display(),
        error = %err,
        "failed to delete transient file"
    );
}
