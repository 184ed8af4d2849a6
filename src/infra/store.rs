//! SQLite-backed storage for the product catalog and verified reviews.
//!
//! Constructed once at process start and injected into the verifier and API
//! handlers. Reviews are append-only: there is no update or delete path.

use chrono::{DateTime, Duration, Utc};
use sqlx::{sqlite::SqlitePool, FromRow};

use crate::domain::{
    CatalogStats, PersistedReview, Product, RankedProduct, RankedReviewer, ReviewSubmission,
};
use crate::infra::{Result, ServiceError};

/// Pool-backed store for products and reviews.
pub struct ReviewStore {
    pool: SqlitePool,
}

impl ReviewStore {
    /// Create a store over an existing connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a store from a database path or `sqlite:` URL.
    pub async fn from_path(path: &str) -> Result<Self> {
        let pool = SqlitePool::connect(path).await?;
        Ok(Self { pool })
    }

    /// Apply embedded schema migrations.
    pub async fn initialize(&self) -> Result<()> {
        crate::migrations::run_sqlite(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Cheap connectivity probe for readiness checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reviews
    // ------------------------------------------------------------------

    /// Persist a verified review. The caller is responsible for having
    /// verified the submission against its on-chain commitment first; this
    /// is a single INSERT with no further side effects.
    pub async fn save_review(&self, submission: &ReviewSubmission) -> Result<PersistedReview> {
        let created_at = Utc::now();
        let stars = submission.stars_u8();

        let row: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO reviews (product_code, reviewer, description, stars, transaction_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING review_id
            "#,
        )
        .bind(&submission.product_code)
        .bind(&submission.reviewer)
        .bind(&submission.description)
        .bind(stars as i64)
        .bind(&submission.transaction_id)
        .bind(created_at.to_rfc3339())
        .fetch_one(&self.pool)
        .await?;

        Ok(PersistedReview {
            review_id: row.0,
            product_code: submission.product_code.clone(),
            reviewer: submission.reviewer.clone(),
            description: submission.description.clone(),
            stars,
            transaction_id: submission.transaction_id.clone(),
            created_at,
        })
    }

    /// All reviews for a product, newest first.
    pub async fn reviews_for_product(&self, product_code: &str) -> Result<Vec<PersistedReview>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT review_id, product_code, reviewer, description, stars, transaction_id, created_at
            FROM reviews
            WHERE product_code = ?
            ORDER BY review_id DESC
            "#,
        )
        .bind(product_code)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PersistedReview::try_from).collect()
    }

    /// A 1-based inclusive window of reviews for a product, newest first.
    /// `from` below 1 is treated as 1; an inverted window yields no rows.
    pub async fn paginated_reviews(
        &self,
        product_code: &str,
        from: i64,
        to: i64,
    ) -> Result<Vec<PersistedReview>> {
        let from = from.max(1);
        if to < from {
            return Ok(Vec::new());
        }
        let limit = to - from + 1;
        let offset = from - 1;

        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT review_id, product_code, reviewer, description, stars, transaction_id, created_at
            FROM reviews
            WHERE product_code = ?
            ORDER BY created_at DESC, review_id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(product_code)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PersistedReview::try_from).collect()
    }

    /// Total number of reviews for a product.
    pub async fn review_count(&self, product_code: &str) -> Result<u64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE product_code = ?")
            .bind(product_code)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.0 as u64)
    }

    /// Average star rating for a product, 0.0 when it has no reviews.
    pub async fn average_stars(&self, product_code: &str) -> Result<f64> {
        let row: (f64,) =
            sqlx::query_as("SELECT COALESCE(AVG(stars), 0.0) FROM reviews WHERE product_code = ?")
                .bind(product_code)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0)
    }

    // ------------------------------------------------------------------
    // Products
    // ------------------------------------------------------------------

    /// Insert or replace a catalog entry.
    pub async fn upsert_product(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO products (code, code_type, name, description, image_url)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.code)
        .bind(&product.code_type)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.image_url)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Exact lookup by barcode value.
    pub async fn product_by_code(&self, code: &str) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            "SELECT code, code_type, name, description, image_url FROM products WHERE code = ?",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    /// Substring search over product names.
    pub async fn search_products_by_name(&self, name: &str, limit: i64) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT code, code_type, name, description, image_url
            FROM products
            WHERE name LIKE ?
            ORDER BY name ASC
            LIMIT ?
            "#,
        )
        .bind(format!("%{}%", name))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    // ------------------------------------------------------------------
    // Explore aggregates
    // ------------------------------------------------------------------

    /// Cataloged products ranked by all-time review count.
    pub async fn most_reviewed(&self, limit: i64) -> Result<Vec<RankedProduct>> {
        let products = sqlx::query_as::<_, RankedProduct>(
            r#"
            SELECT p.code, p.name, p.image_url,
                   COUNT(r.review_id) AS review_count,
                   AVG(r.stars) AS average_stars
            FROM products p
            JOIN reviews r ON r.product_code = p.code
            GROUP BY p.code
            ORDER BY review_count DESC, p.name ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Cataloged products ranked by review count over the trailing 7 days.
    pub async fn trending(&self, limit: i64) -> Result<Vec<RankedProduct>> {
        let cutoff = (Utc::now() - Duration::days(7)).to_rfc3339();

        let products = sqlx::query_as::<_, RankedProduct>(
            r#"
            SELECT p.code, p.name, p.image_url,
                   COUNT(r.review_id) AS review_count,
                   AVG(r.stars) AS average_stars
            FROM products p
            JOIN reviews r ON r.product_code = p.code
            WHERE r.created_at >= ?
            GROUP BY p.code
            ORDER BY review_count DESC, p.name ASC
            LIMIT ?
            "#,
        )
        .bind(&cutoff)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    /// Whole-catalog counters and overall average rating.
    pub async fn total_stats(&self) -> Result<CatalogStats> {
        let row: (i64, i64, f64) = sqlx::query_as(
            r#"
            SELECT (SELECT COUNT(*) FROM products),
                   (SELECT COUNT(*) FROM reviews),
                   (SELECT COALESCE(AVG(stars), 0.0) FROM reviews)
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CatalogStats {
            total_products: row.0,
            total_reviews: row.1,
            average_stars: row.2,
        })
    }

    /// Most recent reviews across all products.
    pub async fn recent_reviews(&self, limit: i64) -> Result<Vec<PersistedReview>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            r#"
            SELECT review_id, product_code, reviewer, description, stars, transaction_id, created_at
            FROM reviews
            ORDER BY review_id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PersistedReview::try_from).collect()
    }

    /// Reviewers ranked by how many verified reviews they have submitted.
    pub async fn top_reviewers(&self, limit: i64) -> Result<Vec<RankedReviewer>> {
        let reviewers = sqlx::query_as::<_, RankedReviewer>(
            r#"
            SELECT reviewer,
                   COUNT(*) AS review_count,
                   AVG(stars) AS average_stars
            FROM reviews
            GROUP BY reviewer
            ORDER BY review_count DESC, reviewer ASC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(reviewers)
    }

    // ------------------------------------------------------------------
    // Demo data
    // ------------------------------------------------------------------

    /// Load the demo product catalog. Idempotent; returns how many rows were
    /// written.
    pub async fn seed_demo_products(&self) -> Result<u32> {
        let mut written = 0u32;
        for product in demo_products() {
            self.upsert_product(&product).await?;
            written += 1;
        }
        Ok(written)
    }
}

/// Raw row from the reviews table.
#[derive(Debug, FromRow)]
struct ReviewRow {
    review_id: i64,
    product_code: String,
    reviewer: String,
    description: String,
    stars: i64,
    transaction_id: String,
    created_at: String,
}

impl TryFrom<ReviewRow> for PersistedReview {
    type Error = ServiceError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        let stars = u8::try_from(row.stars)
            .map_err(|_| ServiceError::Internal(format!("invalid stars value: {}", row.stars)))?;

        let created_at = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| ServiceError::Internal(format!("invalid created_at: {}", e)))?
            .with_timezone(&Utc);

        Ok(PersistedReview {
            review_id: row.review_id,
            product_code: row.product_code,
            reviewer: row.reviewer,
            description: row.description,
            stars,
            transaction_id: row.transaction_id,
            created_at,
        })
    }
}

fn demo_products() -> Vec<Product> {
    let entries = [
        (
            "5000112654042",
            "UPC-A",
            "Coca-Cola Classic",
            "Original taste soft drink with sugar and sweeteners",
        ),
        (
            "5449000000996",
            "UPC-A",
            "Sprite",
            "Lemon and lime flavoured soft drink with sugar and sweetener",
        ),
        (
            "5000112637236",
            "UPC-A",
            "Fanta Orange",
            "Orange flavoured soft drink with sugar and sweeteners",
        ),
        (
            "5060335632302",
            "UPC-A",
            "Oatly Barista Edition",
            "Oat drink specifically developed for coffee",
        ),
        (
            "5060517886554",
            "UPC-A",
            "Beyond Burger",
            "Plant-based burger that looks and cooks like beef",
        ),
        (
            "8410199074037",
            "EAN-13",
            "Pringles Original",
            "Original flavour potato crisps",
        ),
        (
            "5010477348678",
            "UPC-A",
            "Doritos Cool Original",
            "Cool original flavour corn chips",
        ),
        ("8001505005738", "EAN-13", "Nutella", "Hazelnut spread with cocoa"),
        (
            "5000168189585",
            "UPC-A",
            "Heinz Tomato Ketchup",
            "Classic tomato ketchup condiment",
        ),
        (
            "3046920022651",
            "EAN-13",
            "Lindt Excellence 85% Cocoa",
            "Dark chocolate with 85% cocoa content",
        ),
    ];

    entries
        .iter()
        .map(|(code, code_type, name, description)| Product {
            code: code.to_string(),
            code_type: code_type.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            image_url: format!("https://places.example/images/{}.jpg", code),
        })
        .collect()
}
