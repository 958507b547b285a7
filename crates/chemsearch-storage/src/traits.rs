//! The record store trait.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::{Record, StoreQuery};

/// The contract every record store backend implements.
///
/// Implementations must be thread-safe (`Send + Sync`); the search pipeline
/// issues concurrent queries against the same store.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Runs a query against a single collection.
    ///
    /// Rows are returned in the store's natural order, already windowed by
    /// the query's `limit` and `offset`.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::UnknownCollection` if the collection does not exist.
    /// Returns `StoreError::InvalidFilter` if a filter document is rejected.
    /// Returns other variants for infrastructure failures.
    async fn query(&self, collection: &str, query: &StoreQuery) -> Result<Vec<Record>, StoreError>;

    /// Names of the collections this store can resolve.
    fn collections(&self) -> Vec<String>;

    /// Returns whether `collection` resolves in this store.
    fn has_collection(&self, collection: &str) -> bool {
        self.collections().iter().any(|c| c == collection)
    }

    /// Returns the name of this backend for logging.
    fn backend_name(&self) -> &'static str;
}
