//! # chemsearch-storage
//!
//! Record store abstraction for the chemsearch server.
//!
//! This crate defines the contract between the search pipeline and whatever
//! engine actually holds the data. It contains no backend; see
//! `chemsearch-db-memory` for the in-memory implementation.
//!
//! ## Overview
//!
//! The main trait is [`RecordStore`]. A store exposes a fixed set of named
//! collections and answers one kind of request, a [`StoreQuery`], which is
//! either a free-text predicate over a list of fields or a structured filter
//! document, bounded by `limit` and `offset`.
//!
//! ## Example
//!
//! ```ignore
//! use chemsearch_storage::{RecordStore, StoreQuery};
//!
//! async fn find_caffeine(store: &dyn RecordStore) -> StoreResult<Vec<Record>> {
//!     let query = StoreQuery::text("caffeine", vec!["Substance_Name".into()])
//!         .with_limit(10);
//!     store.query("chemical", &query).await
//! }
//! ```

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StoreError};
pub use traits::RecordStore;
pub use types::{FilterDocument, Predicate, Record, ResultSet, StoreQuery};

/// Type alias for a store result.
pub type StoreResult<T> = Result<T, StoreError>;

/// Type alias for a shareable store trait object.
pub type DynRecordStore = std::sync::Arc<dyn RecordStore>;
