//! Review types: untrusted submissions and verified, persisted rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Replacement text stored when a submission carries no usable description.
pub const REVIEW_PLACEHOLDER: &str = "No description was provided!";

/// Ratings are 1-5 stars everywhere in this service; the review contract
/// stores them on a 0-10 scale, so they are scaled by this factor at the
/// hashing/comparison boundary only.
pub const RATING_SCALE: u8 = 2;

/// Lowest admissible star rating.
pub const MIN_STARS: i64 = 1;

/// Highest admissible star rating.
pub const MAX_STARS: i64 = 5;

/// A caller-supplied review claim, untrusted until verified against the
/// on-chain commitment event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSubmission {
    /// Barcode value of the reviewed product.
    pub product_code: String,

    /// Blockchain address claimed to have authored the review.
    pub reviewer: String,

    /// Star rating as supplied. Out-of-range values are clamped, not
    /// rejected, during normalization.
    pub stars: i64,

    /// Free-form review text.
    pub description: String,

    /// Hash of the on-chain transaction expected to contain the matching
    /// commitment event.
    pub transaction_id: String,
}

impl ReviewSubmission {
    /// Apply input normalization: blank descriptions become the placeholder
    /// text and the star rating is clamped into [1, 5].
    pub fn normalized(mut self) -> Self {
        if self.description.trim().is_empty() {
            self.description = REVIEW_PLACEHOLDER.to_string();
        }
        self.stars = self.stars.clamp(MIN_STARS, MAX_STARS);
        self
    }

    /// Star rating after normalization, as stored.
    pub fn stars_u8(&self) -> u8 {
        self.stars.clamp(MIN_STARS, MAX_STARS) as u8
    }

    /// Rating on the contract's 0-10 scale, used for hash recomputation and
    /// on-chain comparison.
    pub fn scaled_rating(&self) -> u8 {
        self.stars_u8() * RATING_SCALE
    }
}

/// A review row after verification succeeded and the write committed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedReview {
    pub review_id: i64,
    pub product_code: String,
    pub reviewer: String,
    pub description: String,
    /// Unscaled 1-5 rating, exactly as submitted (after clamping).
    pub stars: u8,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful verification: the persisted row plus the block the
/// commitment transaction landed in.
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedReview {
    pub review: PersistedReview,
    pub block_number: Option<u64>,
}
