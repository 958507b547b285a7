use std::collections::HashMap;

use async_trait::async_trait;
use chemsearch_storage::{Predicate, Record, RecordStore, StoreError, StoreQuery};
use tokio::sync::RwLock;

use crate::filter::{compile_filter, matches_text};
use crate::seed::SeedData;

/// In-memory record store.
///
/// The set of collections is fixed at construction; each collection's rows
/// sit behind their own `RwLock` so queries on different collections never
/// contend.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    names: Vec<String>,
    data: HashMap<String, RwLock<Vec<Record>>>,
}

impl InMemoryRecordStore {
    /// Creates a store with the given (empty) collections.
    pub fn new<I, S>(collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = collections.into_iter().map(Into::into).collect();
        let data = names
            .iter()
            .map(|n| (n.clone(), RwLock::new(Vec::new())))
            .collect();
        Self { names, data }
    }

    /// Creates a store from seed data. Every seeded key becomes a collection.
    pub fn from_seed(seed: SeedData) -> Self {
        let names: Vec<String> = seed.keys().cloned().collect();
        let data = seed
            .into_iter()
            .map(|(name, rows)| (name, RwLock::new(rows)))
            .collect();
        Self { names, data }
    }

    /// Appends rows to a collection.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownCollection` if the collection does not exist.
    pub async fn insert(
        &self,
        collection: &str,
        records: impl IntoIterator<Item = Record>,
    ) -> Result<usize, StoreError> {
        let rows = self
            .data
            .get(collection)
            .ok_or_else(|| StoreError::unknown_collection(collection))?;
        let mut guard = rows.write().await;
        let before = guard.len();
        guard.extend(records);
        Ok(guard.len() - before)
    }

    /// Number of rows held by a collection.
    pub async fn len(&self, collection: &str) -> Option<usize> {
        match self.data.get(collection) {
            Some(rows) => Some(rows.read().await.len()),
            None => None,
        }
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn query(&self, collection: &str, query: &StoreQuery) -> Result<Vec<Record>, StoreError> {
        let rows = self
            .data
            .get(collection)
            .ok_or_else(|| StoreError::unknown_collection(collection))?;

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.limit).unwrap_or(usize::MAX);

        let guard = rows.read().await;
        let page: Vec<Record> = match &query.predicate {
            Predicate::Text { text, fields } => guard
                .iter()
                .filter(|r| matches_text(r, text, fields))
                .skip(offset)
                .take(limit)
                .cloned()
                .collect(),
            Predicate::Filter(document) => {
                let conditions = compile_filter(document)?;
                guard
                    .iter()
                    .filter(|r| conditions.iter().all(|c| c.matches(r)))
                    .skip(offset)
                    .take(limit)
                    .cloned()
                    .collect()
            }
        };

        tracing::debug!(
            collection,
            rows = page.len(),
            offset = query.offset,
            limit = query.limit,
            "in-memory query"
        );
        Ok(page)
    }

    fn collections(&self) -> Vec<String> {
        self.names.clone()
    }

    fn has_collection(&self, collection: &str) -> bool {
        self.data.contains_key(collection)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
