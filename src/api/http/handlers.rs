// src/api/http/handlers.rs
// Gateway handlers. Both proxy routes return the upstream JSON body verbatim
// on success and a fixed generic message on any failure; no upstream error
// detail (and no credential) ever reaches the caller.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::api::error::{ApiError, ApiResult, IntoApiError};
use crate::geo::Coordinate;
use crate::state::AppState;

pub const MAPS_FAILURE: &str = "Failed to communicate with Google Maps API";
pub const GENAI_FAILURE: &str = "Failed to communicate with Generative AI API";

/// Liveness handler
pub async fn liveness_handler() -> impl IntoResponse {
    Json(json!({
        "status": "Server is up and running!",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339()
    }))
}

#[derive(Deserialize)]
pub struct MapsQuery {
    pub location: String,
    pub radius: Option<u32>,
    pub keyword: Option<String>,
}

/// `GET /api/maps?location=<lat,lng>&radius=<meters>&keyword=<string>`
pub async fn maps_handler(
    State(state): State<AppState>,
    Query(params): Query<MapsQuery>,
) -> ApiResult<impl IntoResponse> {
    let location: Coordinate = params
        .location
        .parse()
        .map_err(|e| ApiError::bad_request(format!("Invalid location parameter: {e}")))?;
    let radius = params.radius.unwrap_or(state.default_radius);
    let keyword = params.keyword.as_deref().unwrap_or(&state.default_keyword);

    info!(%location, radius, keyword, "proxying nearby search");

    let body = state
        .places
        .nearby_search_raw(location, radius, keyword)
        .await
        .into_api_error(MAPS_FAILURE)?;

    Ok(Json(body))
}

#[derive(Deserialize)]
pub struct GenerativeAiRequest {
    pub model: Option<String>,
    pub message: String,
}

/// `POST /api/generative-ai` with body `{model, message}`
pub async fn generative_ai_handler(
    State(state): State<AppState>,
    Json(request): Json<GenerativeAiRequest>,
) -> ApiResult<impl IntoResponse> {
    info!(model = request.model.as_deref(), "proxying generative-ai request");

    let body = state
        .gemini
        .generate_raw(request.model.as_deref(), &request.message)
        .await
        .into_api_error(GENAI_FAILURE)?;

    Ok(Json(body))
}
