//! OpenSearch implementation of the search cluster provider.
//!
//! This module provides a concrete implementation of `SearchClusterProvider`
//! using OpenSearch as the backend.

mod index_config;
mod provider;
pub mod responses;

pub use index_config::{default_mappings, IndexDefinition};
pub use provider::OpenSearchProvider;
