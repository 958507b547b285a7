use axum::{
    Json,
    extract::{Path, Query, State, rejection::QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chemsearch_api::{ApiError, Envelope};
use chemsearch_export::ExportLayout;
use serde::Serialize;

use crate::download::artifact_response;
use crate::search::{RawSearchParams, SearchError};
use crate::server::AppState;

#[derive(Serialize)]
pub struct HealthResponse<'a> {
    status: &'a str,
}

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

/// `GET /search/basic`
pub async fn basic_search(
    State(state): State<AppState>,
    query: Result<Query<RawSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(raw) = query.map_err(rejected_query)?;
    let descriptor = state.normalizer.normalize_basic(&raw)?;
    let results = state.dispatcher.dispatch(&descriptor).await?;

    if descriptor.export {
        let artifact = state
            .packager
            .package(&results, &ExportLayout::Archive)
            .await
            .map_err(SearchError::from)?;
        return artifact_response(artifact).await;
    }

    Ok(Envelope::ok(results).into_response())
}

/// `GET /search/advanced/{model}`
pub async fn advanced_search(
    State(state): State<AppState>,
    Path(model): Path<String>,
    query: Result<Query<RawSearchParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(raw) = query.map_err(rejected_query)?;
    let descriptor = state.normalizer.normalize_advanced(Some(model.as_str()), &raw)?;
    let mut results = state.dispatcher.dispatch(&descriptor).await?;

    if descriptor.export {
        let layout = ExportLayout::SingleCsv { collection: model };
        let artifact = state
            .packager
            .package(&results, &layout)
            .await
            .map_err(SearchError::from)?;
        return artifact_response(artifact).await;
    }

    let rows = results.swap_remove(&model).unwrap_or_default();
    Ok(Envelope::ok(rows).into_response())
}

/// `GET /search/advanced` without a model segment.
pub async fn advanced_search_without_model() -> ApiError {
    SearchError::MissingModel.into()
}

fn rejected_query(rejection: QueryRejection) -> ApiError {
    ApiError::bad_request(rejection.body_text())
}
