//! Route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ApiError, AppState};
use crate::directory::AuthorityDirectory;
use crate::distance::haversine;
use crate::geohash::{self, DecodedGeohash, Neighbors};
use crate::matcher::ParsedAddress;
use crate::models::{Authority, ConfidenceLabel, Coordinate, IssueCategory, MatchResult};

const DEFAULT_ENCODE_PRECISION: usize = 6;
const DEFAULT_NEARBY_PRECISION: usize = 4;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    directory_version: u64,
    directory_source: String,
    directory_loaded_at: DateTime<Utc>,
    authorities: usize,
}

/// Health check endpoint
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let published = state.directory.published();
    Json(HealthResponse {
        status: if published.directory.is_empty() { "degraded" } else { "ok" },
        directory_version: published.version,
        directory_source: published.directory.source().to_string(),
        directory_loaded_at: published.directory.loaded_at(),
        authorities: published.directory.len(),
    })
}

#[derive(Deserialize)]
pub struct EncodeParams {
    lat: f64,
    lng: f64,
    precision: Option<usize>,
}

#[derive(Serialize)]
pub struct EncodeResponse {
    geohash: String,
}

pub async fn encode(Query(params): Query<EncodeParams>) -> Result<Json<EncodeResponse>, ApiError> {
    let coord = Coordinate::new(params.lat, params.lng)?;
    let geohash = geohash::encode(coord, params.precision.unwrap_or(DEFAULT_ENCODE_PRECISION))?;
    Ok(Json(EncodeResponse { geohash }))
}

#[derive(Deserialize)]
pub struct HashParams {
    hash: String,
}

pub async fn decode(Query(params): Query<HashParams>) -> Result<Json<DecodedGeohash>, ApiError> {
    Ok(Json(geohash::decode(&params.hash)?))
}

pub async fn neighbors(Query(params): Query<HashParams>) -> Result<Json<Neighbors>, ApiError> {
    Ok(Json(geohash::neighbors(&params.hash)?))
}

#[derive(Deserialize)]
pub struct DistanceParams {
    from_lat: f64,
    from_lng: f64,
    to_lat: f64,
    to_lng: f64,
}

#[derive(Serialize)]
pub struct DistanceResponse {
    km: f64,
}

pub async fn distance(
    Query(params): Query<DistanceParams>,
) -> Result<Json<DistanceResponse>, ApiError> {
    let from = Coordinate::new(params.from_lat, params.from_lng)?;
    let to = Coordinate::new(params.to_lat, params.to_lng)?;
    Ok(Json(DistanceResponse {
        km: haversine(from, to),
    }))
}

#[derive(Deserialize)]
pub struct MatchParams {
    lat: f64,
    lng: f64,
    /// Reverse-geocoded address text
    #[serde(default)]
    address: String,
    category: String,
}

impl MatchParams {
    fn parse(&self) -> Result<(Coordinate, IssueCategory), ApiError> {
        Ok((Coordinate::new(self.lat, self.lng)?, self.category.parse()?))
    }
}

#[derive(Serialize)]
pub struct RankedAuthority {
    #[serde(flatten)]
    result: MatchResult,
    label: ConfidenceLabel,
}

#[derive(Serialize)]
pub struct MatchResponse {
    results: Vec<RankedAuthority>,
    parsed_address: ParsedAddress,
    directory_version: u64,
}

/// Ranked authorities for a report
pub async fn find_authorities(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchParams>,
) -> Result<Json<MatchResponse>, ApiError> {
    let (coord, category) = params.parse()?;
    let published = state.directory.published();

    let results = state
        .matcher
        .find_authorities(&*published.directory, coord, &params.address, category)?;

    debug!(
        "Matched {} authorities for {} at {}",
        results.len(),
        category,
        coord
    );

    Ok(Json(MatchResponse {
        results: results
            .into_iter()
            .map(|result| RankedAuthority {
                label: result.confidence_label(),
                result,
            })
            .collect(),
        parsed_address: state.matcher.parse_address(&params.address),
        directory_version: published.version,
    }))
}

#[derive(Serialize)]
pub struct HandlesResponse {
    handles: Vec<String>,
    /// True when nothing matched and the configured fallback contact was substituted
    fallback: bool,
}

pub async fn authority_handles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<MatchParams>,
) -> Result<Json<HandlesResponse>, ApiError> {
    let (coord, category) = params.parse()?;
    let directory = state.directory.snapshot();

    let handles = state
        .matcher
        .authority_handles(&*directory, coord, &params.address, category)?;

    if handles.is_empty() {
        if let Some(fallback) = &state.matcher.config().fallback_handle {
            return Ok(Json(HandlesResponse {
                handles: vec![fallback.clone()],
                fallback: true,
            }));
        }
    }

    Ok(Json(HandlesResponse {
        handles,
        fallback: false,
    }))
}

#[derive(Deserialize)]
pub struct NearbyParams {
    lat: f64,
    lng: f64,
    precision: Option<usize>,
    category: Option<String>,
}

#[derive(Serialize)]
pub struct NearbyResponse {
    authorities: Vec<Authority>,
}

pub async fn authorities_near(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> Result<Json<NearbyResponse>, ApiError> {
    let coord = Coordinate::new(params.lat, params.lng)?;
    let category = params
        .category
        .as_deref()
        .map(str::parse::<IssueCategory>)
        .transpose()?;
    let directory = state.directory.snapshot();

    let authorities = state
        .matcher
        .authorities_near(
            &*directory,
            coord,
            params.precision.unwrap_or(DEFAULT_NEARBY_PRECISION),
            category,
        )?
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(NearbyResponse { authorities }))
}

pub async fn authority_by_handle(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Result<Json<Authority>, ApiError> {
    let directory = state.directory.snapshot();
    directory
        .authority_by_handle(&handle)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("no authority with handle {}", handle)))
}

#[derive(Serialize)]
pub struct ValidHandleResponse {
    handle: String,
    valid: bool,
}

pub async fn validate_authority_handle(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
) -> Json<ValidHandleResponse> {
    let directory = state.directory.snapshot();
    let valid = state.matcher.validate_authority_handle(&*directory, &handle);
    Json(ValidHandleResponse { handle, valid })
}
