use std::sync::Arc;

use chemsearch_storage::{DynRecordStore, FilterDocument, ResultSet, StoreQuery};
use futures_util::future::try_join_all;

use super::{QueryDescriptor, QueryText, SearchError};
use crate::config::CollectionSettings;

/// Collections searched by basic queries, with their searchable fields.
///
/// Registration order is the order of keys in basic results.
#[derive(Debug, Clone)]
pub struct CollectionRegistry {
    collections: Arc<[CollectionSettings]>,
}

impl CollectionRegistry {
    pub fn new(collections: Vec<CollectionSettings>) -> Self {
        Self {
            collections: collections.into(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CollectionSettings> {
        self.collections.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.collections.iter().map(|c| c.name.clone()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&CollectionSettings> {
        self.collections.iter().find(|c| c.name == name)
    }
}

/// Executes normalized queries against the record store.
#[derive(Clone)]
pub struct SearchDispatcher {
    store: DynRecordStore,
    registry: CollectionRegistry,
}

impl SearchDispatcher {
    pub fn new(store: DynRecordStore, registry: CollectionRegistry) -> Self {
        Self { store, registry }
    }

    pub fn registry(&self) -> &CollectionRegistry {
        &self.registry
    }

    /// Run `descriptor` and collect rows per collection.
    ///
    /// Basic queries fan out to every registered collection concurrently;
    /// the first failure fails the whole call and no partial result is
    /// returned. Advanced queries hit the single named collection.
    pub async fn dispatch(&self, descriptor: &QueryDescriptor) -> Result<ResultSet, SearchError> {
        let results = match &descriptor.query {
            QueryText::Text(text) => self.dispatch_basic(text, descriptor).await?,
            QueryText::Filter(filter) => self.dispatch_advanced(filter, descriptor).await?,
        };
        tracing::debug!(
            mode = ?descriptor.mode(),
            collections = results.len(),
            rows = results.values().map(Vec::len).sum::<usize>(),
            limit = descriptor.limit,
            offset = descriptor.offset,
            "search dispatched"
        );
        Ok(results)
    }

    async fn dispatch_basic(
        &self,
        text: &str,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultSet, SearchError> {
        let lookups = self.registry.iter().map(|c| {
            let query = StoreQuery::text(text, c.searchable_fields.clone())
                .with_limit(descriptor.limit)
                .with_offset(descriptor.offset);
            let store = self.store.clone();
            async move {
                let rows = store.query(&c.name, &query).await?;
                Ok::<_, SearchError>((c.name.clone(), rows))
            }
        });
        Ok(try_join_all(lookups).await?.into_iter().collect())
    }

    async fn dispatch_advanced(
        &self,
        filter: &FilterDocument,
        descriptor: &QueryDescriptor,
    ) -> Result<ResultSet, SearchError> {
        let collection = descriptor
            .collection
            .as_deref()
            .ok_or(SearchError::MissingModel)?;
        if !self.store.has_collection(collection) {
            return Err(SearchError::UnknownCollection(collection.to_string()));
        }
        let query = StoreQuery::filter(filter.clone())
            .with_limit(descriptor.limit)
            .with_offset(descriptor.offset);
        let rows = self.store.query(collection, &query).await?;
        let mut results = ResultSet::new();
        results.insert(collection.to_string(), rows);
        Ok(results)
    }
}
