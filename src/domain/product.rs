//! Product catalog types.

use serde::{Deserialize, Serialize};

/// A product in the local catalog, keyed by barcode value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    /// Barcode value (UPC-A / EAN-13 digits).
    pub code: String,
    /// Barcode symbology, e.g. "UPC-A" or "EAN-13".
    pub code_type: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
}

/// Aggregate statistics over the whole catalog, served by the explore
/// endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogStats {
    pub total_products: i64,
    pub total_reviews: i64,
    pub average_stars: f64,
}

/// A product together with its review count, for the explore rankings.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RankedProduct {
    pub code: String,
    pub name: String,
    pub image_url: String,
    pub review_count: i64,
    pub average_stars: f64,
}

/// A reviewer ranked by how many verified reviews they have submitted.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct RankedReviewer {
    pub reviewer: String,
    pub review_count: i64,
    pub average_stars: f64,
}
