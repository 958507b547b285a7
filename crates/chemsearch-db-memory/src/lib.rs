//! In-memory record store backend for the chemsearch server.
//!
//! This crate provides an implementation of the `RecordStore` trait from
//! `chemsearch-storage` that keeps every collection in memory behind a
//! per-collection `RwLock`. It is the default backend of the server binary
//! and the backend used by the test suites.
//!
//! # Example
//!
//! ```ignore
//! use chemsearch_db_memory::InMemoryRecordStore;
//! use chemsearch_storage::{RecordStore, StoreQuery};
//!
//! let store = InMemoryRecordStore::new(["chemical", "target"]);
//! store.insert("chemical", records).await?;
//! let rows = store
//!     .query("chemical", &StoreQuery::text("caffeine", fields))
//!     .await?;
//! ```

pub mod filter;
pub mod seed;
pub mod store;

pub use chemsearch_storage::{RecordStore, StoreError};
pub use filter::{FieldCondition, compile_filter};
pub use seed::{SeedData, load_seed_file};
pub use store::InMemoryRecordStore;

