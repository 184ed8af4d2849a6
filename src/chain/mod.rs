//! Chain access for the Places review service.
//!
//! Receipt fetching over JSON-RPC and transaction status lookups against the
//! World developer portal.

mod provider;
mod tx_status;

pub use provider::*;
pub use tx_status::*;
