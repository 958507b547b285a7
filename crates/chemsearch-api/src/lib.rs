use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// -------------------------
// Response envelope
// -------------------------

/// The `{error, data}` body every JSON response carries.
///
/// Exactly one side is meaningful: on success `error` is `null`, on failure
/// `data` is `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            error: None,
            data: Some(data),
        }
    }
}

impl Envelope<serde_json::Value> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            data: None,
        }
    }
}

/// Renders as a JSON body with status 200; [`ApiError`] sets its own status
/// on top.
impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

// -------------------------
// Errors
// -------------------------

/// High-level API errors mapped to HTTP statuses and the failure envelope
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_envelope(&self) -> Envelope<serde_json::Value> {
        Envelope::failure(self.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_envelope()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;
    use serde_json::{Value, json};

    async fn body_json(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn into_response_sets_status_and_envelope() {
        let resp = ApiError::bad_request("Must specify a query").into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let body = body_json(resp).await;
        assert_eq!(body, json!({"error": "Must specify a query", "data": null}));
    }

    #[tokio::test]
    async fn success_envelope_has_null_error() {
        let resp = Envelope::ok(json!({"chemical": [], "target": []})).into_response();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert!(body["error"].is_null());
        assert_eq!(body["data"]["chemical"], json!([]));
    }

    #[tokio::test]
    async fn api_error_status_overrides_envelope_default() {
        let resp = Envelope::failure("detached").into_response();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = ApiError::not_found("Nothing to export for 'chemical'").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body = body_json(resp).await;
        assert_eq!(
            body,
            json!({"error": "Nothing to export for 'chemical'", "data": null})
        );
    }

    #[test]
    fn api_error_variants_map_to_status() {
        let cases = vec![
            (ApiError::bad_request("x"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("x"), StatusCode::NOT_FOUND),
            (ApiError::internal("x"), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.to_envelope().error.as_deref(), Some("x"));
        }
    }
}
