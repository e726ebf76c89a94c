//! HTTP API over the matcher and geohash utilities.

mod handlers;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::directory::SharedDirectory;
use crate::error::GeoError;
use crate::matcher::JurisdictionMatcher;
use crate::models::UnknownVariant;

/// Application state shared across handlers
pub struct AppState {
    pub directory: SharedDirectory,
    pub matcher: JurisdictionMatcher,
}

impl AppState {
    pub fn new(directory: SharedDirectory, matcher: JurisdictionMatcher) -> Self {
        Self { directory, matcher }
    }
}

/// Build the router with all routes and layers.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/v1/geohash/encode", get(handlers::encode))
        .route("/v1/geohash/decode", get(handlers::decode))
        .route("/v1/geohash/neighbors", get(handlers::neighbors))
        .route("/v1/distance", get(handlers::distance))
        .route("/v1/match", get(handlers::find_authorities))
        .route("/v1/match/handles", get(handlers::authority_handles))
        .route("/v1/authorities/nearby", get(handlers::authorities_near))
        .route("/v1/authorities/{handle}", get(handlers::authority_by_handle))
        .route(
            "/v1/authorities/{handle}/valid",
            get(handlers::validate_authority_handle),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Errors surfaced to HTTP clients.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

impl From<GeoError> for ApiError {
    fn from(e: GeoError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl From<UnknownVariant> for ApiError {
    fn from(e: UnknownVariant) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
