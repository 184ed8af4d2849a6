//! REST API integration tests for the Places review service.
//!
//! These drive the full Axum stack against an in-memory SQLite store and a
//! canned receipt provider, without binding a socket.

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use places_reviews::server::AppState;
use places_reviews::{ReviewStore, ReviewVerifier, TxReceipt};

use common::*;

async fn test_app(receipt: Option<TxReceipt>) -> (Router, Arc<ReviewStore>) {
    let store = memory_store().await;
    store.seed_demo_products().await.unwrap();

    let provider = Arc::new(StaticReceiptProvider::new(receipt));
    let verifier = Arc::new(ReviewVerifier::new(provider, store.clone()));

    let state = AppState {
        store: store.clone(),
        verifier,
        lookup: None,
        tx_status: None,
    };

    let app = places_reviews::server::build_router()
        .unwrap()
        .with_state(state);
    (app, store)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

fn submit_body() -> Value {
    json!({
        "product_code": "5000112654042",
        "reviewer": test_reviewer(),
        "stars": 4,
        "description": "Great soda",
        "transaction_id": test_tx_id(),
    })
}

#[tokio::test]
async fn health_endpoint_reports_service() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "places-reviews");
}

#[tokio::test]
async fn readiness_probes_database() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");
}

#[tokio::test]
async fn submitting_a_verified_review_returns_created() {
    let receipt = successful_receipt(vec![commitment_log("5000112654042", 8, "Great soda")]);
    let (app, store) = test_app(Some(receipt)).await;

    let (status, body) = post_json(&app, "/api/v1/reviews", submit_body()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["product_code"], "5000112654042");
    assert_eq!(body["stars"], 4);
    assert_eq!(body["block_number"], 42);
    assert!(body["review_id"].as_i64().unwrap() >= 1);

    assert_eq!(store.review_count("5000112654042").await.unwrap(), 1);
}

#[tokio::test]
async fn tampered_review_gets_content_hash_mismatch_code() {
    let receipt = successful_receipt(vec![commitment_log("5000112654042", 8, "Flat soda")]);
    let (app, store) = test_app(Some(receipt)).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/reviews")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&submit_body()).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.headers().get("x-error-code").unwrap(),
        "CONTENT_HASH_MISMATCH"
    );

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(value["error"]["code"], "CONTENT_HASH_MISMATCH");
    assert_eq!(value["error"]["numeric_code"], 6004);

    assert_eq!(store.review_count("5000112654042").await.unwrap(), 0);
}

#[tokio::test]
async fn malformed_transaction_id_is_bad_request() {
    let (app, _) = test_app(None).await;

    let mut body = submit_body();
    body["transaction_id"] = json!("not-a-hash");

    let (status, value) = post_json(&app, "/api/v1/reviews", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"]["code"], "INVALID_TRANSACTION_ID");
}

#[tokio::test]
async fn unknown_transaction_is_not_found() {
    let (app, _) = test_app(None).await;

    let (status, value) = post_json(&app, "/api/v1/reviews", submit_body()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(value["error"]["code"], "TRANSACTION_NOT_FOUND");
}

#[tokio::test]
async fn product_lookup_serves_seeded_catalog() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/api/v1/products/5000112654042").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Coca-Cola Classic");
    assert_eq!(body["code_type"], "UPC-A");
}

#[tokio::test]
async fn unknown_product_without_lookup_is_not_found() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/api/v1/products/0000000000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "PRODUCT_NOT_FOUND");
}

#[tokio::test]
async fn search_rejects_conflicting_parameters() {
    let (app, _) = test_app(None).await;

    let (status, _) = get(&app, "/api/v1/products/search?id=123&name=cola").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/v1/products/search").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = get(&app, "/api/v1/products/search?name=Cola").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn review_listing_and_pagination() {
    let receipt = successful_receipt(vec![commitment_log("5000112654042", 8, "Great soda")]);
    let (app, _) = test_app(Some(receipt)).await;

    let (status, _) = post_json(&app, "/api/v1/reviews", submit_body()).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = get(&app, "/api/v1/products/5000112654042/reviews").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_reviews"], 1);
    assert_eq!(body["average_rating"], 4.0);
    assert_eq!(body["reviews"][0]["description"], "Great soda");

    let (status, body) = get(&app, "/api/v1/reviews?product_code=5000112654042&start=1&end=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 1);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 1);

    let (status, body) = get(&app, "/api/v1/products/5000112654042/stars").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_stars"], 4.0);
}

#[tokio::test]
async fn explore_returns_stats() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/api/v1/explore?type=stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_products"], 10);
    assert_eq!(body["total_reviews"], 0);

    let (status, body) = get(&app, "/api/v1/explore").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["stats"].is_object());
    assert!(body["most_reviewed"].is_array());

    let (status, _) = get(&app, "/api/v1/explore?type=bogus").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn transaction_status_unconfigured_is_service_unavailable() {
    let (app, _) = test_app(None).await;

    let (status, body) = get(&app, "/api/v1/transactions/0xabc/status").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
}
