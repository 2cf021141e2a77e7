//! Error types for the search gateway repository.
//!
//! This module provides a unified error type for all gateway operations.

mod search_gateway_error;

pub use search_gateway_error::{ErrorKind, SearchGatewayError};
