//! Packaging of serialized collections into downloadable artifacts.
//!
//! Two layouts exist:
//! - a single `<collection>.csv` (advanced search), which refuses to
//!   produce an empty file
//! - a `results.zip` archive with one DEFLATE entry per non-empty
//!   collection (basic search), which may legitimately be empty

use std::path::PathBuf;

use chemsearch_storage::{Record, ResultSet};
use futures_util::future::try_join_all;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::csv::CsvArtifact;
use crate::transient::{TransientFile, TransientStore};
use crate::{ExportError, Result};

/// Download name of multi-collection archives.
pub const ARCHIVE_NAME: &str = "results.zip";

/// How a result set should be packaged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportLayout {
    /// One CSV for the named collection.
    SingleCsv { collection: String },
    /// A zip archive with one CSV per non-empty collection.
    Archive,
}

/// Kind of artifact produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Csv,
    Zip,
}

impl ArtifactKind {
    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Zip => "application/zip",
        }
    }
}

/// One CSV contained in an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    pub name: String,
    pub row_count: usize,
}

/// A packaged export waiting to be transmitted.
///
/// The backing file is deleted when `file` is released or dropped.
#[derive(Debug)]
pub struct ExportArtifact {
    /// Name offered to the client.
    pub download_name: String,
    pub kind: ArtifactKind,
    pub entries: Vec<ArtifactEntry>,
    pub file: TransientFile,
}

impl ExportArtifact {
    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }
}

/// Builds export artifacts in transient storage.
#[derive(Debug, Clone)]
pub struct ExportPackager {
    transient: TransientStore,
}

impl ExportPackager {
    pub fn new(transient: TransientStore) -> Self {
        Self { transient }
    }

    pub fn transient(&self) -> &TransientStore {
        &self.transient
    }

    /// Package `results` according to `layout`.
    ///
    /// For [`ExportLayout::SingleCsv`] a collection missing from `results`
    /// counts as empty.
    pub async fn package(&self, results: &ResultSet, layout: &ExportLayout) -> Result<ExportArtifact> {
        match layout {
            ExportLayout::SingleCsv { collection } => {
                let rows = results.get(collection).map(Vec::as_slice).unwrap_or(&[]);
                self.package_collection(collection, rows).await
            }
            ExportLayout::Archive => self.package_archive(results).await,
        }
    }

    /// Serialize one collection into a single CSV file.
    ///
    /// # Errors
    ///
    /// Returns `ExportError::EmptyExport` when `records` is empty.
    pub async fn package_collection(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<ExportArtifact> {
        let artifact = CsvArtifact::from_records(collection, records)?
            .ok_or_else(|| ExportError::empty_export(collection))?;
        let file = self
            .transient
            .materialize(collection, "csv", &artifact.content)
            .await?;

        tracing::info!(
            collection,
            rows = artifact.row_count,
            bytes = artifact.content.len(),
            "csv export packaged"
        );

        Ok(ExportArtifact {
            entries: vec![ArtifactEntry {
                name: artifact.name.clone(),
                row_count: artifact.row_count,
            }],
            download_name: artifact.name,
            kind: ArtifactKind::Csv,
            file,
        })
    }

    /// Serialize every non-empty collection and bundle them into one zip.
    ///
    /// Per-collection CSV files are written concurrently, then streamed into
    /// the archive and deleted.
    pub async fn package_archive(&self, results: &ResultSet) -> Result<ExportArtifact> {
        let staged = try_join_all(
            results
                .iter()
                .filter(|(_, rows)| !rows.is_empty())
                .map(|(collection, rows)| self.stage_csv(collection, rows)),
        )
        .await?;

        let (archive, file) = self.transient.create("results", "zip").await?;
        let file = file.into_std().await;
        let sources: Vec<(String, PathBuf)> = staged
            .iter()
            .map(|(entry, csv)| (entry.name.clone(), csv.path().to_path_buf()))
            .collect();
        let archive_path = archive.path().to_path_buf();

        let assembled = tokio::task::spawn_blocking(move || write_archive(file, &sources))
            .await
            .map_err(|e| ExportError::file_system(&archive_path, std::io::Error::other(e)))
            .and_then(|r| r.map_err(|e| ExportError::file_system(&archive_path, e)));

        let mut entries = Vec::with_capacity(staged.len());
        for (entry, csv) in staged {
            csv.release().await;
            entries.push(entry);
        }

        if let Err(e) = assembled {
            archive.release().await;
            return Err(e);
        }

        tracing::info!(
            entries = entries.len(),
            rows = entries.iter().map(|e| e.row_count).sum::<usize>(),
            "archive export packaged"
        );

        Ok(ExportArtifact {
            download_name: ARCHIVE_NAME.to_string(),
            kind: ArtifactKind::Zip,
            entries,
            file: archive,
        })
    }

    async fn stage_csv(
        &self,
        collection: &str,
        records: &[Record],
    ) -> Result<(ArtifactEntry, TransientFile)> {
        let artifact = CsvArtifact::from_records(collection, records)?
            .ok_or_else(|| ExportError::empty_export(collection))?;
        let file = self
            .transient
            .materialize(collection, "csv", &artifact.content)
            .await?;
        Ok((
            ArtifactEntry {
                name: artifact.name,
                row_count: artifact.row_count,
            },
            file,
        ))
    }
}

/// Write the archive synchronously. Runs on the blocking pool.
fn write_archive(file: std::fs::File, sources: &[(String, PathBuf)]) -> std::io::Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(file);
    for (name, path) in sources {
        zip.start_file(name.as_str(), options)
            .map_err(zip_to_io)?;
        let mut source = std::fs::File::open(path)?;
        std::io::copy(&mut source, &mut zip)?;
    }
    let mut file = zip.finish().map_err(zip_to_io)?;
    std::io::Write::flush(&mut file)?;
    file.sync_all()
}

fn zip_to_io(err: zip::result::ZipError) -> std::io::Error {
    match err {
        zip::result::ZipError::Io(e) => e,
        other => std::io::Error::other(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Read;
    use std::path::Path;
    use tempfile::tempdir;

    fn rows(n: usize, prefix: &str) -> Vec<Record> {
        (0..n)
            .map(|i| {
                serde_json::from_value(json!({
                    "Substance_Name": format!("{prefix}-{i}"),
                    "Structure_MolWt": 100 + i,
                }))
                .unwrap()
            })
            .collect()
    }

    fn dir_len(path: &Path) -> usize {
        std::fs::read_dir(path).unwrap().count()
    }

    fn read_entry(path: &Path, name: &str) -> String {
        let mut archive = zip::ZipArchive::new(std::fs::File::open(path).unwrap()).unwrap();
        let mut entry = archive.by_name(name).unwrap();
        let mut out = String::new();
        entry.read_to_string(&mut out).unwrap();
        out
    }

    #[tokio::test]
    async fn test_single_csv() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let artifact = packager
            .package_collection("chemical", &rows(2, "caffeine"))
            .await
            .unwrap();

        assert_eq!(artifact.download_name, "chemical.csv");
        assert_eq!(artifact.kind, ArtifactKind::Csv);
        assert_eq!(artifact.content_type(), "text/csv; charset=utf-8");
        let text = std::fs::read_to_string(artifact.file.path()).unwrap();
        assert_eq!(text.lines().count(), 3);

        drop(artifact);
        assert_eq!(dir_len(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_single_csv_empty_is_error() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let err = packager.package_collection("chemical", &[]).await.unwrap_err();
        assert!(err.is_empty_export());
        assert_eq!(dir_len(dir.path()), 0);

        let layout = ExportLayout::SingleCsv {
            collection: "target".into(),
        };
        let err = packager.package(&ResultSet::new(), &layout).await.unwrap_err();
        assert!(err.is_empty_export());
    }

    #[tokio::test]
    async fn test_archive_skips_empty_collections() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let mut results = ResultSet::new();
        results.insert("chemical".into(), rows(3, "caffeine"));
        results.insert("target".into(), Vec::new());

        let artifact = packager.package(&results, &ExportLayout::Archive).await.unwrap();
        assert_eq!(artifact.download_name, "results.zip");
        assert_eq!(artifact.content_type(), "application/zip");
        assert_eq!(
            artifact.entries,
            vec![ArtifactEntry {
                name: "chemical.csv".into(),
                row_count: 3
            }]
        );
        // Only the archive itself remains; staged CSVs are gone.
        assert_eq!(dir_len(dir.path()), 1);

        let archive = zip::ZipArchive::new(std::fs::File::open(artifact.file.path()).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let csv = read_entry(artifact.file.path(), "chemical.csv");
        assert_eq!(csv.lines().count(), 4);
        assert!(csv.starts_with("Substance_Name,Structure_MolWt\n"));

        artifact.file.release().await;
        assert_eq!(dir_len(dir.path()), 0);
    }

    #[tokio::test]
    async fn test_archive_with_both_collections() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let mut results = ResultSet::new();
        results.insert("chemical".into(), rows(1, "a"));
        results.insert("target".into(), rows(2, "b"));

        let artifact = packager.package_archive(&results).await.unwrap();
        let names: Vec<&str> = artifact.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["chemical.csv", "target.csv"]);
        assert_eq!(read_entry(artifact.file.path(), "target.csv").lines().count(), 3);
    }

    #[tokio::test]
    async fn test_empty_archive_is_valid() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let mut results = ResultSet::new();
        results.insert("chemical".into(), Vec::new());
        results.insert("target".into(), Vec::new());

        let artifact = packager.package_archive(&results).await.unwrap();
        assert!(artifact.entries.is_empty());
        let archive = zip::ZipArchive::new(std::fs::File::open(artifact.file.path()).unwrap()).unwrap();
        assert_eq!(archive.len(), 0);
    }

    #[tokio::test]
    async fn test_serialization_failure_leaves_no_files() {
        let dir = tempdir().unwrap();
        let packager = ExportPackager::new(TransientStore::new(dir.path()));
        let mut bad: Vec<Record> = rows(1, "a");
        bad.push(serde_json::from_value(json!({"other": 1})).unwrap());
        let mut results = ResultSet::new();
        results.insert("chemical".into(), bad);
        results.insert("target".into(), rows(2, "b"));

        let err = packager.package_archive(&results).await.unwrap_err();
        assert!(matches!(err, ExportError::Serialization { .. }));
        assert_eq!(dir_len(dir.path()), 0);
    }
}
