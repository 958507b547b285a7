//! Query and row types shared between the pipeline and store backends.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single row: field name to scalar value, in column order.
///
/// Plain data with no tie to any storage engine; the key order of the first
/// record in a sequence defines that sequence's column layout.
pub type Record = IndexMap<String, Value>;

/// Rows per collection, keyed in a deterministic collection order.
pub type ResultSet = IndexMap<String, Vec<Record>>;

/// A structured filter document: field name to predicate.
pub type FilterDocument = Map<String, Value>;

/// What rows a query selects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Predicate {
    /// Free text matched against any of `fields`.
    Text {
        /// The text to look for.
        text: String,
        /// Fields the text is matched against.
        fields: Vec<String>,
    },
    /// A structured filter document interpreted by the backend.
    Filter(FilterDocument),
}

/// A bounded query against one collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreQuery {
    /// Row selection.
    pub predicate: Predicate,
    /// Maximum number of rows to return.
    pub limit: u64,
    /// Number of matching rows to skip.
    pub offset: u64,
}

impl StoreQuery {
    /// Default page size when none is set.
    pub const DEFAULT_LIMIT: u64 = 25;

    /// Creates a free-text query.
    #[must_use]
    pub fn text(text: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            predicate: Predicate::Text {
                text: text.into(),
                fields,
            },
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Creates a structured filter query.
    #[must_use]
    pub fn filter(document: FilterDocument) -> Self {
        Self {
            predicate: Predicate::Filter(document),
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }

    /// Sets the limit.
    #[must_use]
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the offset.
    #[must_use]
    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = offset;
        self
    }
}
