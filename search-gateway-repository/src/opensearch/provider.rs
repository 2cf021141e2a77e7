//! OpenSearch provider implementation.
//!
//! This module provides the concrete implementation of `SearchClusterProvider`
//! using the OpenSearch Rust crate.

use std::future::Future;

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    cert::CertificateValidation,
    http::{
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
    },
    indices::{IndicesCreateParts, IndicesExistsParts},
    params::Refresh,
    BulkParts, IndexParts, MsearchParts, OpenSearch, SearchParts,
};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use url::Url;

use search_gateway_shared::{Document, SearchHit};

use crate::config::ConnectionConfig;
use crate::errors::SearchGatewayError;
use crate::interfaces::SearchClusterProvider;
use crate::opensearch::index_config::IndexDefinition;
use crate::opensearch::responses;
use crate::retry::{with_retry, with_retry_attempts, RetryPolicy};
use crate::types::{BulkItemOutcome, BulkOperation, HitsPage};

/// OpenSearch provider implementation.
///
/// Holds the single connection handle to the cluster. Every request runs
/// under the configured retry policy and request timeout.
///
/// # Example
///
/// ```ignore
/// use search_gateway_repository::{ConnectionConfig, OpenSearchProvider};
///
/// let config = ConnectionConfig::new("https://localhost:9200")
///     .with_credentials("admin", "admin");
/// let provider = OpenSearchProvider::new(&config).await?;
/// assert!(provider.ping().await?);
/// ```
pub struct OpenSearchProvider {
    client: OpenSearch,
    retry: RetryPolicy,
    refresh_writes: bool,
}

impl OpenSearchProvider {
    /// Create a new OpenSearch provider from connection settings.
    ///
    /// No request is sent; use `ping` to verify the cluster is reachable.
    ///
    /// # Arguments
    ///
    /// * `config` - Cluster URL, credentials, TLS and timeout/retry settings
    ///
    /// # Returns
    ///
    /// * `Ok(OpenSearchProvider)` - A new provider instance
    /// * `Err(SearchGatewayError::TransportError)` - If the URL is invalid or
    ///   the transport cannot be built
    pub async fn new(config: &ConnectionConfig) -> Result<Self, SearchGatewayError> {
        let parsed_url =
            Url::parse(&config.url).map_err(|e| SearchGatewayError::transport(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool)
            .disable_proxy()
            .timeout(config.request_timeout);

        if let Some(credentials) = &config.credentials {
            builder = builder.auth(Credentials::Basic(
                credentials.username.clone(),
                credentials.password.clone(),
            ));
        }

        if config.accept_invalid_certs {
            warn!(
                url = %config.url,
                "TLS certificate verification is disabled for the search cluster"
            );
            builder = builder.cert_validation(CertificateValidation::None);
        }

        let transport = builder
            .build()
            .map_err(|e| SearchGatewayError::transport(e.to_string()))?;

        info!(
            url = %config.url,
            authenticated = config.credentials.is_some(),
            timeout_secs = config.request_timeout.as_secs(),
            max_attempts = config.retry.max_attempts,
            "Created OpenSearch provider"
        );

        Ok(Self {
            client: OpenSearch::new(transport),
            retry: config.retry,
            refresh_writes: false,
        })
    }

    /// Make writes wait for the next refresh so they are visible to searches
    /// as soon as the call returns.
    pub fn with_refresh_writes(mut self, refresh_writes: bool) -> Self {
        self.refresh_writes = refresh_writes;
        self
    }

    fn transport_error(e: opensearch::Error) -> SearchGatewayError {
        SearchGatewayError::transport(e.to_string())
    }

    /// Turn a non-success response into a `RequestError` carrying the body.
    async fn ensure_success(
        response: Response,
        operation: &str,
    ) -> Result<Response, SearchGatewayError> {
        let status = response.status_code();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        debug!(
            operation = operation,
            status = %status,
            body = %error_body,
            "Search cluster rejected request"
        );
        Err(SearchGatewayError::request(
            status.as_u16(),
            format!("{} failed: {}", operation, error_body),
        ))
    }

    async fn read_json(response: Response) -> Result<Value, SearchGatewayError> {
        response
            .json::<Value>()
            .await
            .map_err(|e| SearchGatewayError::parse(e.to_string()))
    }

    /// Run a search request with the given body and return the parsed response.
    async fn search_body(
        &self,
        operation: &str,
        index: &str,
        body: &Value,
        from: Option<i64>,
        size: Option<i64>,
    ) -> Result<Value, SearchGatewayError> {
        let client = &self.client;
        with_retry(&self.retry, operation, move || async move {
            let indices = [index];
            let mut request = client.search(SearchParts::Index(&indices)).body(body);
            if let Some(from) = from {
                request = request.from(from);
            }
            if let Some(size) = size {
                request = request.size(size);
            }
            let response = request.send().await.map_err(Self::transport_error)?;
            let response = Self::ensure_success(response, operation).await?;
            Self::read_json(response).await
        })
        .await
    }
}

fn to_i64(value: u64, name: &str) -> Result<i64, SearchGatewayError> {
    i64::try_from(value)
        .map_err(|_| SearchGatewayError::validation(format!("{} {} is too large", name, value)))
}

/// Send a bulk request under the retry policy and parse its items.
///
/// A request that timed out may still have been applied. When a later
/// attempt sees its own `create` items rejected with a version conflict,
/// those items are reported as written.
async fn run_bulk<F, Fut>(
    retry: &RetryPolicy,
    index: &str,
    expected: usize,
    mut send: F,
) -> Result<Vec<BulkItemOutcome>, SearchGatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value, SearchGatewayError>>,
{
    let (attempt, body) = with_retry_attempts(retry, "bulk", |attempt| {
        let request = send();
        async move { request.await.map(|body| (attempt, body)) }
    })
    .await?;

    let mut outcomes = responses::parse_bulk_response(&body)?;
    if outcomes.len() != expected {
        return Err(SearchGatewayError::parse(format!(
            "bulk response has {} items for {} operations",
            outcomes.len(),
            expected
        )));
    }

    if attempt > 1 {
        let (replayed, reconciled) = responses::accept_replayed_creates(outcomes);
        outcomes = replayed;
        if reconciled > 0 {
            warn!(
                index = %index,
                attempt = attempt,
                reconciled = reconciled,
                "Retried bulk request found documents created by an earlier attempt"
            );
        }
    }

    debug!(
        index = %index,
        operations = expected,
        attempt = attempt,
        errors = body["errors"].as_bool().unwrap_or(false),
        "Bulk request completed"
    );
    Ok(outcomes)
}

/// Send a create-index request under the retry policy.
///
/// An "already exists" answer to a retried attempt means an earlier attempt
/// created the index before its response was lost.
async fn run_create_index<F, Fut>(
    retry: &RetryPolicy,
    index: &str,
    mut send: F,
) -> Result<(), SearchGatewayError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), SearchGatewayError>>,
{
    with_retry_attempts(retry, "create_index", |attempt| {
        let request = send();
        async move {
            match request.await {
                Err(e) if attempt > 1 && e.is_index_already_exists() => {
                    warn!(
                        index = %index,
                        attempt = attempt,
                        "Retried create_index found the index created by an earlier attempt"
                    );
                    Ok(())
                }
                result => result,
            }
        }
    })
    .await
}

#[async_trait]
impl SearchClusterProvider for OpenSearchProvider {
    async fn ping(&self) -> Result<bool, SearchGatewayError> {
        let client = &self.client;
        with_retry(&self.retry, "ping", move || async move {
            let response = client.ping().send().await.map_err(Self::transport_error)?;
            Ok(response.status_code().is_success())
        })
        .await
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchGatewayError> {
        let client = &self.client;
        with_retry(&self.retry, "index_exists", move || async move {
            let response = client
                .indices()
                .exists(IndicesExistsParts::Index(&[index]))
                .send()
                .await
                .map_err(Self::transport_error)?;

            if response.status_code().as_u16() == 404 {
                return Ok(false);
            }
            Self::ensure_success(response, "index_exists").await?;
            Ok(true)
        })
        .await
    }

    async fn create_index(
        &self,
        index: &str,
        definition: &IndexDefinition,
    ) -> Result<(), SearchGatewayError> {
        let client = &self.client;
        let body = definition.to_body();
        let body = &body;
        run_create_index(&self.retry, index, move || async move {
            let response = client
                .indices()
                .create(IndicesCreateParts::Index(index))
                .body(body)
                .send()
                .await
                .map_err(Self::transport_error)?;
            Self::ensure_success(response, "create_index").await?;
            Ok(())
        })
        .await?;

        debug!(index = %index, "Index created");
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        document_id: &str,
        document: &Document,
    ) -> Result<String, SearchGatewayError> {
        let client = &self.client;
        let refresh_writes = self.refresh_writes;
        let body = with_retry(&self.retry, "index_document", move || async move {
            let mut request = client
                .index(IndexParts::IndexId(index, document_id))
                .body(document);
            if refresh_writes {
                request = request.refresh(Refresh::WaitFor);
            }
            let response = request.send().await.map_err(Self::transport_error)?;
            let response = Self::ensure_success(response, "index_document").await?;
            Self::read_json(response).await
        })
        .await?;

        let id = responses::parse_indexed_id(&body)?;
        debug!(index = %index, doc_id = %id, "Document indexed");
        Ok(id)
    }

    async fn bulk(
        &self,
        index: &str,
        operations: &[BulkOperation],
    ) -> Result<Vec<BulkItemOutcome>, SearchGatewayError> {
        let client = &self.client;
        let refresh_writes = self.refresh_writes;
        let lines = responses::bulk_body(operations);
        let lines = &lines;
        run_bulk(&self.retry, index, operations.len(), move || async move {
            let payload: Vec<JsonBody<&Value>> = lines.iter().map(JsonBody::new).collect();
            let mut request = client.bulk(BulkParts::Index(index)).body(payload);
            if refresh_writes {
                request = request.refresh(Refresh::WaitFor);
            }
            let response = request.send().await.map_err(Self::transport_error)?;
            let response = Self::ensure_success(response, "bulk").await?;
            Self::read_json(response).await
        })
        .await
    }

    async fn find_by_field(
        &self,
        index: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<SearchHit>, SearchGatewayError> {
        let query = responses::term_query(field, value);
        let body = self
            .search_body("find_by_field", index, &query, None, None)
            .await?;
        responses::parse_hits(&body)
    }

    async fn find_first_by_field_many(
        &self,
        index: &str,
        field: &str,
        values: &[Value],
    ) -> Result<Vec<Option<SearchHit>>, SearchGatewayError> {
        if values.is_empty() {
            return Ok(Vec::new());
        }

        let client = &self.client;
        let lines = responses::existence_msearch_body(field, values);
        let lines = &lines;
        let body = with_retry(&self.retry, "msearch", move || async move {
            let payload: Vec<JsonBody<&Value>> = lines.iter().map(JsonBody::new).collect();
            let response = client
                .msearch(MsearchParts::Index(&[index]))
                .body(payload)
                .send()
                .await
                .map_err(Self::transport_error)?;
            let response = Self::ensure_success(response, "msearch").await?;
            Self::read_json(response).await
        })
        .await?;

        responses::parse_first_hits(&body, values.len())
    }

    async fn search_all(
        &self,
        index: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Option<HitsPage>, SearchGatewayError> {
        let from = to_i64(offset, "offset")?;
        let size = to_i64(limit, "limit")?;
        let query = json!({ "query": { "match_all": {} } });
        let body = self
            .search_body("search_all", index, &query, Some(from), Some(size))
            .await?;
        responses::parse_hits_page(&body)
    }

    async fn find_by_document_id(
        &self,
        index: &str,
        document_id: &str,
    ) -> Result<Option<SearchHit>, SearchGatewayError> {
        let query = json!({ "query": { "match": { "_id": document_id } } });
        let body = self
            .search_body("find_by_document_id", index, &query, None, Some(1))
            .await?;
        Ok(responses::parse_hits(&body)?.into_iter().next())
    }
}
