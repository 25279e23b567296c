//! API handlers

use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;
use crate::apps::Analysis;

/// Body format for lookup requests.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct IdRequest {
    pub external_id: String,
}

/// Look up the analysis ID associated with an external ID.
///
/// The body is decoded by hand so that every malformed request becomes a
/// plain 400 carrying the decoder's message. A missing `external_id` field
/// decodes to the empty string and is rejected like an explicit empty value.
/// Resolution failures of any kind are reported as 500 with the error text.
pub async fn lookup(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Analysis>, (StatusCode, String)> {
    let request: IdRequest =
        serde_json::from_slice(&body).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    if request.external_id.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "external ID must be set".to_string(),
        ));
    }

    let analysis = state.apps.resolve(&request.external_id).await.map_err(|e| {
        tracing::warn!(external_id = %request.external_id, error = %e, "analysis lookup failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(Json(analysis))
}

/// Health check
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
