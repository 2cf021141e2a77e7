//! # Search Gateway
//!
//! Startup binary for the search gateway - connects to the search cluster,
//! checks connectivity and makes sure the configured index exists.
//!
//! ## Modules
//!
//! - [`config`]: Environment settings and dependency initialization

pub mod config;

pub use config::{ConnectionMode, Dependencies, GatewaySettings};

use search_gateway_repository::SearchGatewayError;
use thiserror::Error;

/// Errors that can occur during gateway startup.
#[derive(Error, Debug)]
pub enum GatewayStartupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The search cluster could not be reached or refused the ping.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A gateway operation failed.
    #[error("Search gateway error: {0}")]
    GatewayError(#[from] SearchGatewayError),
}

impl GatewayStartupError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::ConnectionError(msg.into())
    }
}
