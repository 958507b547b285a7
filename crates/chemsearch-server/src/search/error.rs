use chemsearch_api::ApiError;
use chemsearch_export::ExportError;
use chemsearch_storage::StoreError;
use thiserror::Error;

/// Failures of the request pipeline, from parameter normalization to packaging.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Must specify a query")]
    MissingQuery,

    #[error("Model must be specified in the advanced search")]
    MissingModel,

    #[error("Unable to convert q from JSON: {0}")]
    MalformedFilter(String),

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Record store error: {0}")]
    Store(StoreError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

impl SearchError {
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingQuery | Self::MissingModel | Self::MalformedFilter(_)
        )
    }
}

impl From<StoreError> for SearchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownCollection { collection } => Self::UnknownCollection(collection),
            other => Self::Store(other),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let message = err.to_string();
        if err.is_client_error() {
            return ApiError::bad_request(message);
        }
        match err {
            SearchError::Export(ref e) if e.is_empty_export() => ApiError::not_found(message),
            SearchError::Store(ref e) => {
                tracing::error!(
                    error = %message,
                    category = %e.category(),
                    "search request failed"
                );
                ApiError::internal(message)
            }
            _ => {
                tracing::error!(error = %message, "search request failed");
                ApiError::internal(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn client_errors_map_to_bad_request() {
        for err in [
            SearchError::MissingQuery,
            SearchError::MissingModel,
            SearchError::MalformedFilter("expected value".into()),
        ] {
            assert!(err.is_client_error());
            assert_eq!(ApiError::from(err).status_code(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn unknown_collection_from_store_is_server_error() {
        let err: SearchError = StoreError::unknown_collection("widgets").into();
        assert!(matches!(err, SearchError::UnknownCollection(ref c) if c == "widgets"));
        let api = ApiError::from(err);
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(api.to_string().contains("widgets"));
    }

    #[test]
    fn store_failures_are_server_errors() {
        let err: SearchError = StoreError::timeout("target after 5s").into();
        assert!(!err.is_client_error());
        let api = ApiError::from(err);
        assert_eq!(api.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            api.to_string(),
            "Record store error: Query timed out: target after 5s"
        );
    }

    #[test]
    fn empty_export_maps_to_not_found() {
        let err: SearchError = ExportError::empty_export("chemical").into();
        assert_eq!(ApiError::from(err).status_code(), StatusCode::NOT_FOUND);

        let err: SearchError = ExportError::serialization("row 1 has fields [a]").into();
        assert_eq!(
            ApiError::from(err).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
