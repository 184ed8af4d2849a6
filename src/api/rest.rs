//! REST API endpoints for the Places review service.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::api::{missing_field, not_configured, validation_error, ApiError};
use crate::chain::TransactionStatus;
use crate::domain::{PersistedReview, Product, ReviewSubmission};
use crate::lookup::ExternalProduct;
use crate::server::AppState;

/// Build the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/v1/products/search", get(search_products))
        .route("/v1/products/:code", get(get_product))
        .route("/v1/products/:code/reviews", get(list_product_reviews))
        .route("/v1/products/:code/stars", get(get_average_stars))
        .route("/v1/reviews", get(list_reviews).post(submit_review))
        .route("/v1/explore", get(explore))
        .route(
            "/v1/transactions/:transaction_id/status",
            get(transaction_status),
        )
}

// ============================================================================
// Products
// ============================================================================

fn product_from_external(code: &str, ext: ExternalProduct) -> Product {
    Product {
        code: code.to_string(),
        code_type: ext.code_type.unwrap_or_else(|| "UNKNOWN".to_string()),
        name: ext.name,
        description: ext.description,
        image_url: ext.image_url.unwrap_or_default(),
    }
}

/// Resolve a product: local catalog first, then the external barcode service.
/// Successful external lookups are cached back into the catalog.
async fn resolve_product(state: &AppState, code: &str) -> Result<Option<Product>, ApiError> {
    if let Some(product) = state.store.product_by_code(code).await? {
        return Ok(Some(product));
    }

    let Some(lookup) = state.lookup.as_ref() else {
        return Ok(None);
    };

    match lookup.lookup(code).await? {
        Some(ext) => {
            let product = product_from_external(code, ext);
            state.store.upsert_product(&product).await?;
            Ok(Some(product))
        }
        None => Ok(None),
    }
}

/// GET /api/v1/products/:code
async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Product>, ApiError> {
    if code.trim().is_empty() {
        return Err(missing_field("code"));
    }

    resolve_product(&state, &code)
        .await?
        .map(Json)
        .ok_or_else(|| {
            ApiError::from(crate::infra::ServiceError::ProductNotFound(code.clone()))
        })
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    id: Option<String>,
    name: Option<String>,
}

/// GET /api/v1/products/search?name=|id=
///
/// Exactly one of `name` (substring match, capped at 10) or `id` (exact
/// barcode, external fallback) is allowed.
async fn search_products(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>, ApiError> {
    match (query.id, query.name) {
        (Some(_), Some(_)) => Err(validation_error(
            "id",
            "Only one parameter (either id OR name) is allowed",
        )),
        (None, None) => Err(missing_field("id or name")),
        (None, Some(name)) => {
            let products = state.store.search_products_by_name(&name, 10).await?;
            Ok(Json(products))
        }
        (Some(id), None) => {
            let products = resolve_product(&state, &id).await?.into_iter().collect();
            Ok(Json(products))
        }
    }
}

// ============================================================================
// Reviews
// ============================================================================

#[derive(Debug, Serialize)]
struct ProductReviewsResponse {
    reviews: Vec<PersistedReview>,
    total_reviews: u64,
    average_rating: f64,
}

/// GET /api/v1/products/:code/reviews
async fn list_product_reviews(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<ProductReviewsResponse>, ApiError> {
    let reviews = state.store.reviews_for_product(&code).await?;
    let average_rating = state.store.average_stars(&code).await?;

    Ok(Json(ProductReviewsResponse {
        total_reviews: reviews.len() as u64,
        average_rating,
        reviews,
    }))
}

#[derive(Debug, Deserialize)]
struct ReviewsQuery {
    product_code: Option<String>,
    /// 1-based first review position (inclusive).
    start: Option<i64>,
    /// 1-based last review position (inclusive).
    end: Option<i64>,
}

#[derive(Debug, Serialize)]
struct PaginatedReviewsResponse {
    reviews: Vec<PersistedReview>,
    total_count: u64,
}

/// GET /api/v1/reviews?product_code=&start=&end=
async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> Result<Json<PaginatedReviewsResponse>, ApiError> {
    let product_code = query.product_code.ok_or_else(|| missing_field("product_code"))?;

    let start = query.start.unwrap_or(1);
    let end = query.end.unwrap_or(10);

    let reviews = state
        .store
        .paginated_reviews(&product_code, start, end)
        .await?;
    let total_count = state.store.review_count(&product_code).await?;

    Ok(Json(PaginatedReviewsResponse {
        reviews,
        total_count,
    }))
}

#[derive(Debug, Serialize)]
struct AverageStarsResponse {
    product_code: String,
    average_stars: f64,
}

/// GET /api/v1/products/:code/stars
async fn get_average_stars(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<AverageStarsResponse>, ApiError> {
    let average_stars = state.store.average_stars(&code).await?;

    Ok(Json(AverageStarsResponse {
        product_code: code,
        average_stars,
    }))
}

#[derive(Debug, Deserialize)]
struct SubmitReviewRequest {
    product_code: String,
    reviewer: String,
    stars: i64,
    #[serde(default)]
    description: String,
    transaction_id: String,
}

#[derive(Debug, Serialize)]
struct SubmitReviewResponse {
    review_id: i64,
    product_code: String,
    stars: u8,
    transaction_id: String,
    block_number: Option<u64>,
}

/// POST /api/v1/reviews
///
/// Verifies the claimed review against its on-chain commitment event and
/// persists it only on success. Each verification failure returns a distinct
/// error code.
async fn submit_review(
    State(state): State<AppState>,
    Json(request): Json<SubmitReviewRequest>,
) -> Result<(StatusCode, Json<SubmitReviewResponse>), ApiError> {
    if request.product_code.trim().is_empty() {
        return Err(missing_field("product_code"));
    }
    if request.reviewer.trim().is_empty() {
        return Err(missing_field("reviewer"));
    }

    let submission = ReviewSubmission {
        product_code: request.product_code,
        reviewer: request.reviewer,
        stars: request.stars,
        description: request.description,
        transaction_id: request.transaction_id,
    };

    let verified = state.verifier.verify_and_store(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitReviewResponse {
            review_id: verified.review.review_id,
            product_code: verified.review.product_code,
            stars: verified.review.stars,
            transaction_id: verified.review.transaction_id,
            block_number: verified.block_number,
        }),
    ))
}

// ============================================================================
// Explore
// ============================================================================

#[derive(Debug, Deserialize)]
struct ExploreQuery {
    #[serde(rename = "type")]
    kind: Option<String>,
    limit: Option<i64>,
}

/// GET /api/v1/explore?type=&limit=
async fn explore(
    State(state): State<AppState>,
    Query(query): Query<ExploreQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);

    let body = match query.kind.as_deref() {
        Some("most-reviewed") => serde_json::json!(state.store.most_reviewed(limit).await?),
        Some("trending") => serde_json::json!(state.store.trending(limit).await?),
        Some("stats") => serde_json::json!(state.store.total_stats().await?),
        Some("recent-reviews") => serde_json::json!(state.store.recent_reviews(limit).await?),
        Some("top-reviewers") => serde_json::json!(state.store.top_reviewers(limit).await?),
        Some("all") | None => serde_json::json!({
            "most_reviewed": state.store.most_reviewed(5).await?,
            "trending": state.store.trending(5).await?,
            "stats": state.store.total_stats().await?,
            "recent_reviews": state.store.recent_reviews(5).await?,
            "top_reviewers": state.store.top_reviewers(5).await?,
        }),
        Some(other) => {
            return Err(validation_error(
                "type",
                format!("Unknown explore type: {}", other),
            ))
        }
    };

    Ok(Json(body))
}

// ============================================================================
// Transaction status
// ============================================================================

/// GET /api/v1/transactions/:transaction_id/status
///
/// Single status lookup against the developer portal; callers own the
/// polling loop.
async fn transaction_status(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> Result<Json<TransactionStatus>, ApiError> {
    let client = state
        .tx_status
        .as_ref()
        .ok_or_else(|| not_configured("Transaction status service"))?;

    let status = client.status(&transaction_id).await?;
    Ok(Json(status))
}
