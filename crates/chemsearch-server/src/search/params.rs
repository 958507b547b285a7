//! Query normalization.
//!
//! Raw query-string parameters arrive as optional strings. They are turned
//! into a [`QueryDescriptor`] before anything touches the record store, so
//! malformed requests are rejected without side effects.

use chemsearch_storage::FilterDocument;
use serde::Deserialize;
use serde_json::Value;

use super::SearchError;

/// Query-string parameters shared by both search endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    pub q: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
    /// Presence alone requests a file export; the value is ignored.
    pub file: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Basic,
    Advanced,
}

/// The query payload after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryText {
    /// Free text matched across each collection's searchable fields.
    Text(String),
    /// A structured filter evaluated against one collection.
    Filter(FilterDocument),
}

/// A validated search request.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    /// Target collection; only set for advanced searches.
    pub collection: Option<String>,
    pub query: QueryText,
    pub limit: u64,
    pub offset: u64,
    pub export: bool,
}

impl QueryDescriptor {
    /// Free text means a basic search, a filter document an advanced one.
    pub fn mode(&self) -> SearchMode {
        match self.query {
            QueryText::Text(_) => SearchMode::Basic,
            QueryText::Filter(_) => SearchMode::Advanced,
        }
    }
}

/// Turns raw parameters into [`QueryDescriptor`]s.
#[derive(Debug, Clone, Copy)]
pub struct QueryNormalizer {
    default_limit: u64,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self::new(chemsearch_storage::StoreQuery::DEFAULT_LIMIT)
    }
}

impl QueryNormalizer {
    pub fn new(default_limit: u64) -> Self {
        Self { default_limit }
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit
    }

    /// Normalize a basic (free-text) search.
    ///
    /// # Errors
    ///
    /// `SearchError::MissingQuery` when `q` is absent or empty.
    pub fn normalize_basic(&self, raw: &RawSearchParams) -> Result<QueryDescriptor, SearchError> {
        let (limit, offset) = self.paging(raw);
        let text = required_query(raw)?;
        Ok(QueryDescriptor {
            collection: None,
            query: QueryText::Text(text.to_string()),
            limit,
            offset,
            export: raw.file.is_some(),
        })
    }

    /// Normalize an advanced (structured filter) search against `model`.
    ///
    /// # Errors
    ///
    /// - `SearchError::MissingModel` when `model` is absent or empty
    /// - `SearchError::MissingQuery` when `q` is absent or empty
    /// - `SearchError::MalformedFilter` when `q` is not a JSON object
    pub fn normalize_advanced(
        &self,
        model: Option<&str>,
        raw: &RawSearchParams,
    ) -> Result<QueryDescriptor, SearchError> {
        let collection = model
            .filter(|m| !m.is_empty())
            .ok_or(SearchError::MissingModel)?;
        let (limit, offset) = self.paging(raw);
        let text = required_query(raw)?;
        let filter = parse_filter(text)?;
        Ok(QueryDescriptor {
            collection: Some(collection.to_string()),
            query: QueryText::Filter(filter),
            limit,
            offset,
            export: raw.file.is_some(),
        })
    }

    fn paging(&self, raw: &RawSearchParams) -> (u64, u64) {
        let limit = raw
            .limit
            .as_deref()
            .and_then(parse_leading_int)
            .filter(|n| *n > 0)
            .map_or(self.default_limit, |n| n as u64);
        let offset = raw
            .offset
            .as_deref()
            .and_then(parse_leading_int)
            .map_or(0, |n| n.max(0) as u64);
        (limit, offset)
    }
}

fn required_query(raw: &RawSearchParams) -> Result<&str, SearchError> {
    raw.q
        .as_deref()
        .filter(|q| !q.is_empty())
        .ok_or(SearchError::MissingQuery)
}

fn parse_filter(text: &str) -> Result<FilterDocument, SearchError> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SearchError::MalformedFilter(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(SearchError::MalformedFilter(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Parse the leading integer of `input`, ignoring any trailing characters.
///
/// Leading whitespace and a single sign are accepted. Returns `None` when no
/// digits follow, or when the value does not fit in an `i64`.
pub fn parse_leading_int(input: &str) -> Option<i64> {
    let s = input.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let digits_end = rest
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }
    let magnitude: i64 = rest[..digits_end].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
