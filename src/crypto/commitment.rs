//! Review commitment hashing.
//!
//! The ProductReviewCommitments contract binds a review to its author with
//! two keccak-256 digests over ABI-packed tuples:
//!
//! ```text
//! content_hash = keccak256(abi.encodePacked(string barcode, uint8 rating, string text))
//! barcode_hash = keccak256(abi.encodePacked(string barcode))
//! ```
//!
//! The rating inside the hash is on the contract's 0-10 scale. Packed
//! encoding of a `string` is its raw UTF-8 bytes (no length prefix) and a
//! `uint8` is a single byte, so the preimage is a plain concatenation.

use alloy::primitives::{keccak256, B256};
use alloy::sol;

sol! {
    /// Emitted by the ProductReviewCommitments contract once a review
    /// commitment is accepted. `barcode` carries the hex-encoded keccak-256
    /// hash of the product code, not the raw code.
    #[derive(Debug, PartialEq)]
    event ReviewCommitmentSubmitted(
        string barcode,
        address reviewer,
        uint8 rating,
        bytes32 contentHash,
        uint256 worldIdNullifierHash
    );
}

/// Recompute the content commitment for a review.
///
/// `scaled_rating` must already be on the contract's 0-10 scale.
pub fn content_hash(product_code: &str, scaled_rating: u8, review_text: &str) -> B256 {
    let mut preimage = Vec::with_capacity(product_code.len() + 1 + review_text.len());
    preimage.extend_from_slice(product_code.as_bytes());
    preimage.push(scaled_rating);
    preimage.extend_from_slice(review_text.as_bytes());
    keccak256(&preimage)
}

/// Recompute the barcode commitment for a product code.
pub fn barcode_hash(product_code: &str) -> B256 {
    keccak256(product_code.as_bytes())
}
