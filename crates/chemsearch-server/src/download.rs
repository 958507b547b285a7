//! Streaming of export artifacts to the client.
//!
//! The response body owns the artifact's [`TransientFile`], so the file is
//! removed once the body is dropped: after the last chunk is sent, on a
//! read error, or when the client goes away mid-transfer.

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::Response;
use chemsearch_api::ApiError;
use chemsearch_export::{ExportArtifact, ExportError, TransientFile};
use futures_util::Stream;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::search::SearchError;

pin_project_lite::pin_project! {
    /// File contents as a body stream, deleting the file when dropped.
    pub struct TransientFileStream {
        #[pin]
        inner: ReaderStream<File>,
        guard: TransientFile,
    }
}

impl TransientFileStream {
    pub fn new(file: File, guard: TransientFile) -> Self {
        Self {
            inner: ReaderStream::new(file),
            guard,
        }
    }

    pub fn guard(&self) -> &TransientFile {
        &self.guard
    }
}

impl Stream for TransientFileStream {
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_next(cx)
    }
}

/// Build the download response for `artifact`.
pub async fn artifact_response(artifact: ExportArtifact) -> Result<Response, ApiError> {
    let ExportArtifact {
        download_name,
        kind,
        entries,
        file: guard,
    } = artifact;

    let file = match File::open(guard.path()).await {
        Ok(f) => f,
        Err(e) => {
            let err = ExportError::file_system(guard.path(), e);
            guard.release().await;
            return Err(SearchError::from(err).into());
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    tracing::info!(
        download = %download_name,
        content_type = kind.content_type(),
        entries = entries.len(),
        bytes = ?length,
        "streaming export"
    );

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, kind.content_type())
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&download_name),
        );
    if let Some(len) = length {
        builder = builder.header(header::CONTENT_LENGTH, len);
    }

    builder
        .body(Body::from_stream(TransientFileStream::new(file, guard)))
        .map_err(|e| ApiError::internal(format!("failed to build download response: {e}")))
}

/// `attachment` disposition with a header-safe filename.
pub fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() || c == ' ' => c,
            _ => '_',
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
