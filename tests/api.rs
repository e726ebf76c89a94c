//! Integration tests for the HTTP API.
//!
//! Drives the router in-process against the built-in seed directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use beacon::api::{self, AppState};
use beacon::directory::{SharedDirectory, StaticDirectory};
use beacon::matcher::{AddressConfig, JurisdictionMatcher, MatcherConfig};

const INDIRANAGAR: &str = "lat=12.9716&lng=77.5946\
    &address=100%20Feet%20Road%2C%20Indiranagar%2C%20Bangalore%2C%20Karnataka%2C%20560038";
const MID_ATLANTIC: &str = "lat=0&lng=-30";

fn test_app_with(config: MatcherConfig, directory: SharedDirectory) -> axum::Router {
    let matcher = JurisdictionMatcher::new(config, &AddressConfig::default()).unwrap();
    api::router(Arc::new(AppState::new(directory, matcher)))
}

/// Helper: seed directory, default matcher settings.
fn test_app() -> axum::Router {
    test_app_with(
        MatcherConfig::default(),
        SharedDirectory::new(StaticDirectory::seed().unwrap()),
    )
}

/// Helper: GET `uri`, returning the status and JSON body.
async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ids(results: &Value, key: &str) -> Vec<String> {
    results
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r[key].as_str().unwrap().to_string())
        .collect()
}

// -- Health -------------------------------------------------------------------

#[tokio::test]
async fn test_health_reports_directory() {
    let (status, body) = get_json(test_app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["directory_version"], 1);
    assert_eq!(body["authorities"], 15);
    assert_eq!(body["directory_source"], "seed");
}

#[tokio::test]
async fn test_health_degraded_when_directory_empty() {
    let app = test_app_with(
        MatcherConfig::default(),
        SharedDirectory::new(StaticDirectory::empty()),
    );
    let (status, body) = get_json(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["authorities"], 0);
}

// -- Geohash and distance -----------------------------------------------------

#[tokio::test]
async fn test_geohash_encode() {
    let (status, body) = get_json(
        test_app(),
        "/v1/geohash/encode?lat=12.9716&lng=77.5946&precision=4",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["geohash"], "tdr1");
}

#[tokio::test]
async fn test_geohash_encode_default_precision() {
    let (status, body) = get_json(test_app(), "/v1/geohash/encode?lat=12.9716&lng=77.5946").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["geohash"].as_str().unwrap().len(), 6);
}

#[tokio::test]
async fn test_geohash_encode_rejects_bad_input() {
    let (status, body) = get_json(test_app(), "/v1/geohash/encode?lat=91&lng=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = get_json(
        test_app(),
        "/v1/geohash/encode?lat=12.9716&lng=77.5946&precision=13",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_geohash_decode() {
    let (status, body) = get_json(test_app(), "/v1/geohash/decode?hash=tdr1").await;
    assert_eq!(status, StatusCode::OK);

    let lat = body["center"]["lat"].as_f64().unwrap();
    let lng = body["center"]["lng"].as_f64().unwrap();
    assert!((lat - 12.9716).abs() <= body["lat_error"].as_f64().unwrap());
    assert!((lng - 77.5946).abs() <= body["lng_error"].as_f64().unwrap());
}

#[tokio::test]
async fn test_geohash_decode_rejects_invalid_character() {
    let (status, body) = get_json(test_app(), "/v1/geohash/decode?hash=tdra").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("tdra"));
}

#[tokio::test]
async fn test_geohash_neighbors() {
    let (status, body) = get_json(test_app(), "/v1/geohash/neighbors?hash=tdr1v9").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["top"], "tdr1vd");
    assert_eq!(body["bottom"], "tdr1v8");
    assert_eq!(body["right"], "tdr1vc");
    assert_eq!(body["left"], "tdr1v3");
    assert_eq!(body["top_right"], "tdr1vf");
    assert_eq!(body["bottom_left"], "tdr1v2");
}

#[tokio::test]
async fn test_distance_bangalore_chennai() {
    let (status, body) = get_json(
        test_app(),
        "/v1/distance?from_lat=12.9716&from_lng=77.5946&to_lat=13.0827&to_lng=80.2707",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let km = body["km"].as_f64().unwrap();
    assert!((km - 290.17).abs() < 0.5, "got {km}");
}

// -- Matching -----------------------------------------------------------------

#[tokio::test]
async fn test_match_pothole_in_bangalore() {
    let uri = format!("/v1/match?{INDIRANAGAR}&category=pothole");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);

    let results = &body["results"];
    assert_eq!(ids(results, "authority_id"), vec!["bbmp", "ka_pwd"]);
    assert_eq!(results[0]["handle"], "@BBMPCOMM");
    assert_eq!(results[0]["confidence"], 0.9);
    assert_eq!(results[0]["match_reason"], "geohash_category");
    assert_eq!(results[0]["label"], "high");

    assert_eq!(body["parsed_address"]["city"], "Bangalore");
    assert_eq!(body["parsed_address"]["state"], "Karnataka");
    assert_eq!(body["parsed_address"]["postal_code"], "560038");
    assert_eq!(body["directory_version"], 1);
}

#[tokio::test]
async fn test_match_nothing_in_the_ocean() {
    let uri = format!("/v1/match?{MID_ATLANTIC}&category=other");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_match_rejects_unknown_category() {
    let uri = format!("/v1/match?{INDIRANAGAR}&category=teleportation");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_match_rejects_out_of_range_coordinate() {
    let (status, _) = get_json(test_app(), "/v1/match?lat=12&lng=181&category=pothole").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_handles() {
    let uri = format!("/v1/match/handles?{INDIRANAGAR}&category=pothole");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handles"], serde_json::json!(["@BBMPCOMM", "@PWDKarnataka"]));
    assert_eq!(body["fallback"], false);
}

#[tokio::test]
async fn test_match_handles_without_fallback() {
    let uri = format!("/v1/match/handles?{MID_ATLANTIC}&category=other");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handles"], Value::Array(vec![]));
    assert_eq!(body["fallback"], false);
}

#[tokio::test]
async fn test_match_handles_uses_configured_fallback() {
    let config = MatcherConfig {
        fallback_handle: Some("@CivicHelpdesk".to_string()),
        ..MatcherConfig::default()
    };
    let app = test_app_with(config, SharedDirectory::new(StaticDirectory::seed().unwrap()));

    let uri = format!("/v1/match/handles?{MID_ATLANTIC}&category=other");
    let (status, body) = get_json(app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["handles"], serde_json::json!(["@CivicHelpdesk"]));
    assert_eq!(body["fallback"], true);
}

// -- Authorities --------------------------------------------------------------

#[tokio::test]
async fn test_authorities_nearby_filters_by_category() {
    let (status, body) = get_json(
        test_app(),
        "/v1/authorities/nearby?lat=12.9716&lng=77.5946&category=water_supply",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let found = ids(&body["authorities"], "id");
    assert!(found.contains(&"bwssb".to_string()));
    assert!(!found.contains(&"bbmp".to_string()));
    assert!(!found.contains(&"ka_uddd".to_string()));
}

#[tokio::test]
async fn test_authorities_nearby_in_the_ocean() {
    let uri = format!("/v1/authorities/nearby?{MID_ATLANTIC}&precision=5");
    let (status, body) = get_json(test_app(), &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorities"], Value::Array(vec![]));
}

#[tokio::test]
async fn test_authority_by_handle() {
    let (status, body) = get_json(test_app(), "/v1/authorities/%40BBMPCOMM").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "bbmp");
    assert_eq!(body["priority_tier"], 1);

    // Case-insensitive, leading '@' optional
    let (status, body) = get_json(test_app(), "/v1/authorities/bbmpcomm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "bbmp");
}

#[tokio::test]
async fn test_authority_by_handle_not_found() {
    let (status, body) = get_json(test_app(), "/v1/authorities/%40nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("@nobody"));
}

#[tokio::test]
async fn test_validate_authority_handle() {
    let (status, body) = get_json(test_app(), "/v1/authorities/%40chennaicorp/valid").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (_, body) = get_json(test_app(), "/v1/authorities/%40nobody/valid").await;
    assert_eq!(body["valid"], false);
    assert_eq!(body["handle"], "@nobody");
}

// -- Reload -------------------------------------------------------------------

#[tokio::test]
async fn test_replaced_directory_is_served() {
    let directory = SharedDirectory::new(StaticDirectory::seed().unwrap());
    let app = test_app_with(MatcherConfig::default(), directory.clone());

    let (status, _) = get_json(app.clone(), "/v1/authorities/%40BBMPCOMM").await;
    assert_eq!(status, StatusCode::OK);

    directory.replace(StaticDirectory::empty());

    let (status, _) = get_json(app.clone(), "/v1/authorities/%40BBMPCOMM").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = get_json(app, "/health").await;
    assert_eq!(body["directory_version"], 2);
    assert_eq!(body["authorities"], 0);
}
