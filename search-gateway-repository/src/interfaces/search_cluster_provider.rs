//! Search cluster provider trait definition.
//!
//! This module defines the abstract interface for the raw cluster calls the
//! gateway is built on, allowing for different backend implementations
//! (OpenSearch, Elasticsearch, in-memory mocks).

use async_trait::async_trait;
use serde_json::Value;

use search_gateway_shared::{Document, SearchHit};

use crate::errors::SearchGatewayError;
use crate::opensearch::IndexDefinition;
use crate::types::{BulkItemOutcome, BulkOperation, HitsPage};

/// Abstracts the underlying search cluster (OpenSearch, Elasticsearch, etc.).
///
/// Each method maps to a single cluster request. Reconciliation, validation
/// and result shaping live in `SearchGateway`, so implementations stay thin
/// and mock implementations can be injected in tests.
///
/// All methods return `Result<T, SearchGatewayError>` for consistent error
/// handling across backends.
#[async_trait]
pub trait SearchClusterProvider: Send + Sync {
    /// Ping the cluster.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The cluster answered with a success status
    /// * `Ok(false)` - The cluster answered with any other status
    /// * `Err(SearchGatewayError::TransportError)` - The cluster could not be reached
    async fn ping(&self) -> Result<bool, SearchGatewayError>;

    /// Check whether an index exists.
    async fn index_exists(&self, index: &str) -> Result<bool, SearchGatewayError>;

    /// Create an index with the given settings and mappings.
    async fn create_index(
        &self,
        index: &str,
        definition: &IndexDefinition,
    ) -> Result<(), SearchGatewayError>;

    /// Index a single document under `document_id`, replacing any existing one.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The identifier the cluster stored the document under
    async fn index_document(
        &self,
        index: &str,
        document_id: &str,
        document: &Document,
    ) -> Result<String, SearchGatewayError>;

    /// Send one bulk request.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<BulkItemOutcome>)` - One outcome per operation, in request order.
    ///   Item-level rejections are reported here, not as an `Err`.
    /// * `Err(SearchGatewayError)` - If the request as a whole failed
    async fn bulk(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<Vec<BulkItemOutcome>, SearchGatewayError>;

    /// Run a boolean-must term query on `field` and return every hit.
    async fn find_by_field(
        &self,
        index: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<SearchHit>, SearchGatewayError>;

    /// Run one term query per value in a single round trip and return the
    /// first hit of each, in the order of `values`.
    async fn find_first_by_field_many(
        &self,
        index: &str,
        field: &str,
        values: &[Value],
    ) -> Result<Vec<Option<SearchHit>>, SearchGatewayError>;

    /// Run a match-all query starting at `offset` returning at most `limit` hits.
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - The response had no hits section
    async fn search_all(
        &self,
        index: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Option<HitsPage>, SearchGatewayError>;

    /// Match a document by its internal identifier (`_id`) and return the first hit.
    async fn find_by_document_id(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<Option<SearchHit>, SearchGatewayError>;
}
