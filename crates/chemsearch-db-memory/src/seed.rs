//! Seed loading for the in-memory store.

use std::path::Path;

use chemsearch_storage::{Record, StoreError};
use indexmap::IndexMap;

/// Collection name to rows, in file order.
pub type SeedData = IndexMap<String, Vec<Record>>;

/// Reads a JSON seed file of the form `{"chemical": [...], "target": [...]}`.
///
/// # Errors
///
/// Returns `StoreError::Internal` if the file cannot be read or is not a map
/// of collection names to arrays of flat objects.
pub async fn load_seed_file(path: impl AsRef<Path>) -> Result<SeedData, StoreError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        StoreError::internal(format!("failed to read seed file {}: {e}", path.display()))
    })?;
    let seed: SeedData = serde_json::from_slice(&bytes).map_err(|e| {
        StoreError::internal(format!("invalid seed file {}: {e}", path.display()))
    })?;

    for (collection, rows) in &seed {
        tracing::info!(collection = %collection, rows = rows.len(), "seed collection loaded");
    }
    Ok(seed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryRecordStore;
    use chemsearch_storage::RecordStore;

    #[tokio::test]
    async fn test_load_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(
            &path,
            r#"{"chemical": [{"Substance_Name": "Caffeine", "Structure_MolWt": 194.19}], "target": []}"#,
        )
        .unwrap();

        let seed = load_seed_file(&path).await.unwrap();
        assert_eq!(seed.len(), 2);
        assert_eq!(seed["chemical"].len(), 1);

        let store = InMemoryRecordStore::from_seed(seed);
        assert_eq!(store.collections(), vec!["chemical", "target"]);
        assert_eq!(store.len("chemical").await, Some(1));
    }

    #[tokio::test]
    async fn test_missing_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_seed_file(dir.path().join("absent.json"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("failed to read seed file"));
    }

    #[tokio::test]
    async fn test_malformed_seed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"chemical": {"not": "an array"}}"#).unwrap();
        let err = load_seed_file(&path).await.unwrap_err();
        assert!(err.to_string().contains("invalid seed file"));
    }
}
