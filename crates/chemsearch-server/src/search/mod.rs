//! Search pipeline: parameter normalization and store dispatch.

mod dispatcher;
mod error;
mod params;

pub use dispatcher::{CollectionRegistry, SearchDispatcher};
pub use error::SearchError;
pub use params::{
    QueryDescriptor, QueryNormalizer, QueryText, RawSearchParams, SearchMode, parse_leading_int,
};
