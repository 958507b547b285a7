//! Record store construction from configuration.

use std::sync::Arc;

use chemsearch_db_memory::{InMemoryRecordStore, load_seed_file};
use chemsearch_storage::{DynRecordStore, StoreError};

use crate::config::AppConfig;

/// Create the in-memory record store for `cfg`.
///
/// Every configured collection exists even when the seed file lacks it;
/// collections present only in the seed are added alongside.
pub async fn create_store(cfg: &AppConfig) -> Result<DynRecordStore, StoreError> {
    let seed = match &cfg.storage.seed_path {
        Some(path) => {
            let seed = load_seed_file(path).await?;
            tracing::info!(
                path = %path.display(),
                collections = seed.len(),
                "seed file loaded"
            );
            seed
        }
        None => Default::default(),
    };

    let mut names: Vec<String> = cfg.collections.iter().map(|c| c.name.clone()).collect();
    for name in seed.keys() {
        if !names.contains(name) {
            names.push(name.clone());
        }
    }

    let store = InMemoryRecordStore::new(names);
    for (collection, rows) in seed {
        let inserted = store.insert(&collection, rows).await?;
        tracing::debug!(collection = %collection, rows = inserted, "collection seeded");
    }
    Ok(Arc::new(store))
}
