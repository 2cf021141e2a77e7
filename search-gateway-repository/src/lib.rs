//! # Search Gateway Repository
//!
//! This crate provides the search gateway service and the traits and
//! implementations it uses to talk to the search cluster. It includes
//! definitions for errors, the cluster provider interface, a concrete
//! implementation for OpenSearch, and the retry policy applied to every
//! outbound call.

pub mod config;
pub mod errors;
pub mod interfaces;
pub mod opensearch;
pub mod retry;
pub mod service;
pub mod types;
pub mod upsert;
pub mod utils;

pub use config::{BasicCredentials, ConnectionConfig, SearchGatewayConfig};
pub use errors::{ErrorKind, SearchGatewayError};
pub use interfaces::SearchClusterProvider;
pub use opensearch::{IndexDefinition, OpenSearchProvider};
pub use retry::RetryPolicy;
pub use service::SearchGateway;
pub use types::{
    BulkAction, BulkItemFailure, BulkItemOutcome, BulkOperation, BulkUpsertSummary,
    ConnectivityStatus, HitsPage,
};
pub use utils::{document_key, validate_index_name};
