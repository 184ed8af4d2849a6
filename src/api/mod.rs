//! API layer for the Places review service.
//!
//! REST endpoints plus structured error responses.

mod error;
mod rest;

pub use error::*;
pub use rest::*;
