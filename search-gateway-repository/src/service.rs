//! Search gateway service implementation.
//!
//! This module provides the main service application code uses to talk to
//! the search cluster: connectivity checks, index creation, single-document
//! inserts, reconciled bulk upserts, paginated listing and lookup by id.
//!
//! # Note on Upserts
//!
//! `bulk_upsert` decides per document whether to create or update by looking
//! up the identifier field first. New documents are created under their own
//! identifier; existing ones are updated in place at the internal `_id` of
//! the first match.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use search_gateway_shared::{Document, Lookup, PageRequest, SearchHit, SearchPage};

use crate::config::SearchGatewayConfig;
use crate::errors::SearchGatewayError;
use crate::interfaces::SearchClusterProvider;
use crate::opensearch::IndexDefinition;
use crate::types::{BulkUpsertSummary, ConnectivityStatus};
use crate::upsert::{distinct_lookup_values, KeyedDocument, UpsertPlan};
use crate::utils::{document_key, validate_index_name};

/// The main service for interacting with the search cluster.
///
/// This is the high-level API that application code should use. It validates
/// input, reconciles bulk upserts against what is already stored and shapes
/// query results, delegating raw cluster calls to a `SearchClusterProvider`.
/// Every failure is logged and returned as a `SearchGatewayError`.
///
/// The provider is shared behind an `Arc`, so the gateway can be cloned
/// cheaply and used from concurrent tasks.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use search_gateway_repository::{ConnectionConfig, OpenSearchProvider, SearchGateway};
/// use search_gateway_shared::{Document, PageRequest};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OpenSearchProvider::new(&ConnectionConfig::new("http://localhost:9200")).await?;
/// let gateway = SearchGateway::new(Arc::new(provider));
///
/// gateway.ensure_index_exists("articles").await?;
///
/// let documents = vec![Document::new().with_field("id", 1).with_field("title", "A")];
/// let summary = gateway.bulk_upsert("articles", documents).await?;
/// assert_eq!(summary.created, 1);
///
/// let page = gateway.list_documents("articles", PageRequest::default()).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SearchGateway {
    provider: Arc<dyn SearchClusterProvider>,
    config: SearchGatewayConfig,
}

impl SearchGateway {
    /// Create a new SearchGateway with default configuration.
    ///
    /// The default configuration limits bulk upserts to 1000 documents and
    /// reads identifiers from the `id` field.
    ///
    /// # Arguments
    ///
    /// * `provider` - A shared implementation of `SearchClusterProvider` (e.g., `OpenSearchProvider`)
    pub fn new(provider: Arc<dyn SearchClusterProvider>) -> Self {
        Self {
            provider,
            config: SearchGatewayConfig::default(),
        }
    }

    /// Create a new SearchGateway with custom configuration.
    ///
    /// # Arguments
    ///
    /// * `provider` - A shared implementation of `SearchClusterProvider`
    /// * `config` - Batch limit, identifier field and default index definition
    pub fn with_config(provider: Arc<dyn SearchClusterProvider>, config: SearchGatewayConfig) -> Self {
        Self { provider, config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SearchGatewayConfig {
        &self.config
    }

    /// Check if batch size exceeds the configured limit.
    fn validate_batch_size(&self, size: usize) -> Result<(), SearchGatewayError> {
        if let Some(max) = self.config.max_batch_size {
            if size > max {
                return Err(SearchGatewayError::batch_size_exceeded(size, max));
            }
        }
        Ok(())
    }

    /// Check that the cluster is reachable.
    ///
    /// # Returns
    ///
    /// * `Ok(ConnectivityStatus::Connected)` - The ping succeeded
    /// * `Ok(ConnectivityStatus::Unreachable)` - The cluster answered with a non-success status
    /// * `Err(SearchGatewayError::TransportError)` - The cluster could not be reached
    #[instrument(skip(self))]
    pub async fn check_connectivity(&self) -> Result<ConnectivityStatus, SearchGatewayError> {
        match self.provider.ping().await {
            Ok(true) => {
                info!("{}", ConnectivityStatus::Connected);
                Ok(ConnectivityStatus::Connected)
            }
            Ok(false) => {
                warn!("{}", ConnectivityStatus::Unreachable);
                Ok(ConnectivityStatus::Unreachable)
            }
            Err(e) => {
                error!(error = %e, "{}", ConnectivityStatus::Unreachable);
                Err(e)
            }
        }
    }

    /// Create an index.
    ///
    /// # Arguments
    ///
    /// * `index` - Name of the index to create
    /// * `definition` - Settings and mappings; the configured default when `None`
    ///
    /// # Returns
    ///
    /// * `Ok(())` - If the index was created
    /// * `Err(SearchGatewayError::ValidationError)` - If the index name is invalid
    /// * `Err(SearchGatewayError::RequestError)` - If the cluster rejected the request
    ///   (including when the index already exists)
    #[instrument(skip(self, definition))]
    pub async fn create_index(
        &self,
        index: &str,
        definition: Option<&IndexDefinition>,
    ) -> Result<(), SearchGatewayError> {
        validate_index_name(index)?;
        let definition = definition.unwrap_or(&self.config.index_definition);

        self.provider
            .create_index(index, definition)
            .await
            .inspect_err(|e| error!(index = %index, error = %e, "Failed to create index"))?;

        info!(index = %index, "Index created");
        Ok(())
    }

    /// Create an index with the default definition unless it already exists.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - If the index was created by this call
    /// * `Ok(false)` - If the index already existed
    #[instrument(skip(self))]
    pub async fn ensure_index_exists(&self, index: &str) -> Result<bool, SearchGatewayError> {
        validate_index_name(index)?;

        let exists = self
            .provider
            .index_exists(index)
            .await
            .inspect_err(|e| error!(index = %index, error = %e, "Failed to check index existence"))?;
        if exists {
            info!(index = %index, "Index already exists");
            return Ok(false);
        }

        match self
            .provider
            .create_index(index, &self.config.index_definition)
            .await
        {
            Ok(()) => {
                info!(index = %index, "Index created");
                Ok(true)
            }
            // Lost a race with another creator.
            Err(e) if e.is_index_already_exists() => {
                info!(index = %index, "Index already exists");
                Ok(false)
            }
            Err(e) => {
                error!(index = %index, error = %e, "Failed to create index");
                Err(e)
            }
        }
    }

    /// Index a single document.
    ///
    /// The document's identifier field becomes its internal identifier. A
    /// document without one is stored under a freshly generated UUID v4.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The identifier assigned by the cluster
    /// * `Err(SearchGatewayError::ValidationError)` - If the identifier is neither a
    ///   non-empty string nor a number
    #[instrument(skip(self, document))]
    pub async fn insert_document(
        &self,
        index: &str,
        document: Document,
    ) -> Result<String, SearchGatewayError> {
        validate_index_name(index)?;

        let document_id = match document.id_value(&self.config.id_field) {
            None => Uuid::new_v4().to_string(),
            Some(_) => document_key(&document, &self.config.id_field, 0)?,
        };

        let id = self
            .provider
            .index_document(index, &document_id, &document)
            .await
            .inspect_err(|e| {
                error!(index = %index, doc_id = %document_id, error = %e, "Failed to index document")
            })?;

        info!(index = %index, doc_id = %id, "Document indexed");
        Ok(id)
    }

    /// Create or update a batch of documents in one bulk request.
    ///
    /// Every document must carry an identifier. The identifiers are looked up
    /// in a single multi-search round trip; documents with no match are
    /// created under their identifier and documents with a match update the
    /// first matching document in place.
    ///
    /// # Arguments
    ///
    /// * `index` - Target index
    /// * `documents` - Documents to upsert, processed in input order
    ///
    /// # Returns
    ///
    /// * `Ok(BulkUpsertSummary)` - Counts of created and updated documents
    /// * `Err(SearchGatewayError::BatchSizeExceeded)` - If the batch exceeds the configured maximum
    /// * `Err(SearchGatewayError::ValidationError)` - If a document has no usable identifier
    /// * `Err(SearchGatewayError::PartialBulkError)` - If the cluster rejected any item;
    ///   every rejected item is listed
    #[instrument(skip(self, documents), fields(batch_size = documents.len()))]
    pub async fn bulk_upsert(
        &self,
        index: &str,
        documents: Vec<Document>,
    ) -> Result<BulkUpsertSummary, SearchGatewayError> {
        if documents.is_empty() {
            return Ok(BulkUpsertSummary::default());
        }

        validate_index_name(index)?;
        self.validate_batch_size(documents.len())?;

        let id_field = self.config.id_field.as_str();
        let total = documents.len();
        let keyed = documents
            .into_iter()
            .enumerate()
            .map(|(position, document)| {
                let key = document_key(&document, id_field, position)?;
                Ok(KeyedDocument { key, document })
            })
            .collect::<Result<Vec<_>, SearchGatewayError>>()?;

        let (keys, values): (Vec<String>, Vec<Value>) =
            distinct_lookup_values(&keyed, id_field).into_iter().unzip();

        let first_hits = self
            .provider
            .find_first_by_field_many(index, id_field, &values)
            .await
            .inspect_err(|e| error!(index = %index, error = %e, "Existence lookup failed"))?;

        if first_hits.len() != keys.len() {
            let e = SearchGatewayError::parse(format!(
                "existence lookup returned {} results for {} ids",
                first_hits.len(),
                keys.len()
            ));
            error!(index = %index, error = %e, "Existence lookup failed");
            return Err(e);
        }

        let existing: HashMap<String, String> = keys
            .into_iter()
            .zip(first_hits)
            .filter_map(|(key, hit)| hit.map(|hit| (key, hit.id)))
            .collect();

        let plan = UpsertPlan::build(keyed, &existing);

        let outcomes = self
            .provider
            .bulk(index, &plan.operations)
            .await
            .inspect_err(|e| error!(index = %index, error = %e, "Bulk request failed"))?;

        let failures: Vec<_> = outcomes
            .into_iter()
            .filter_map(|outcome| outcome.into_failure())
            .collect();

        if !failures.is_empty() {
            let e = SearchGatewayError::partial_bulk(failures);
            error!(
                index = %index,
                failed = e.bulk_failures().map_or(0, <[_]>::len),
                error = %e,
                "Bulk upsert partially failed"
            );
            return Err(e);
        }

        info!(
            index = %index,
            created = plan.created,
            updated = plan.updated,
            "Bulk upsert completed"
        );

        Ok(BulkUpsertSummary {
            total,
            created: plan.created,
            updated: plan.updated,
        })
    }

    /// Find every document whose identifier field equals `id`.
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SearchHit>)` - All matching hits, possibly empty
    #[instrument(skip(self))]
    pub async fn lookup_existing(
        &self,
        index: &str,
        id: &Value,
    ) -> Result<Vec<SearchHit>, SearchGatewayError> {
        validate_index_name(index)?;

        self.provider
            .find_by_field(index, &self.config.id_field, id)
            .await
            .inspect_err(|e| error!(index = %index, id = %id, error = %e, "Existence lookup failed"))
    }

    /// List one page of documents.
    ///
    /// # Returns
    ///
    /// * `Ok(Lookup::Found(SearchPage))` - The page, echoing `page` and `page_size`
    /// * `Ok(Lookup::NotFound)` - If the page holds no documents
    /// * `Err(SearchGatewayError::ValidationError)` - If `page` or `page_size` is zero
    #[instrument(skip(self))]
    pub async fn list_documents(
        &self,
        index: &str,
        request: PageRequest,
    ) -> Result<Lookup<SearchPage>, SearchGatewayError> {
        validate_index_name(index)?;
        request.validate().map_err(SearchGatewayError::validation)?;

        let hits = self
            .provider
            .search_all(index, request.offset(), request.limit())
            .await
            .inspect_err(|e| error!(index = %index, error = %e, "Failed to list documents"))?;

        Ok(match hits {
            Some(hits) if !hits.hits.is_empty() => Lookup::Found(SearchPage {
                total: hits.total,
                documents: hits.hits,
                page: request.page,
                page_size: request.page_size,
            }),
            _ => Lookup::NotFound,
        })
    }

    /// Get a document by its internal identifier (`_id`).
    ///
    /// # Returns
    ///
    /// * `Ok(Lookup::Found(SearchHit))` - The first matching hit
    /// * `Ok(Lookup::NotFound)` - If nothing matched
    #[instrument(skip(self))]
    pub async fn get_document(
        &self,
        index: &str,
        id: &str,
    ) -> Result<Lookup<SearchHit>, SearchGatewayError> {
        validate_index_name(index)?;
        if id.is_empty() {
            return Err(SearchGatewayError::validation("Document id is required"));
        }

        let hit = self
            .provider
            .find_by_document_id(index, id)
            .await
            .inspect_err(|e| error!(index = %index, doc_id = %id, error = %e, "Failed to get document"))?;

        Ok(Lookup::from(hit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BulkAction, BulkItemError, BulkItemOutcome, BulkOperation, HitsPage};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::Mutex;

    /// Mock provider that records requests and answers from canned data.
    struct MockProvider {
        ping: Result<bool, SearchGatewayError>,
        existing_index: bool,
        create_error: Option<SearchGatewayError>,
        first_hits: HashMap<String, SearchHit>,
        listing: Option<HitsPage>,
        reject_ids: Vec<String>,
        bulk_requests: Mutex<Vec<Vec<BulkOperation>>>,
        msearch_requests: Mutex<Vec<Vec<Value>>>,
        created_indices: Mutex<Vec<(String, IndexDefinition)>>,
        indexed: Mutex<Vec<(String, Document)>>,
        searches: Mutex<Vec<(u64, u64)>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                ping: Ok(true),
                existing_index: false,
                create_error: None,
                first_hits: HashMap::new(),
                listing: None,
                reject_ids: Vec::new(),
                bulk_requests: Mutex::new(Vec::new()),
                msearch_requests: Mutex::new(Vec::new()),
                created_indices: Mutex::new(Vec::new()),
                indexed: Mutex::new(Vec::new()),
                searches: Mutex::new(Vec::new()),
            }
        }

        fn with_existing(mut self, key: &str, internal_id: &str) -> Self {
            self.first_hits.insert(key.to_string(), hit(internal_id, json!({"id": key})));
            self
        }
    }

    fn hit(id: &str, source: Value) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            index: "articles".to_string(),
            score: Some(1.0),
            source: Document::from_value(source).unwrap(),
        }
    }

    #[async_trait]
    impl SearchClusterProvider for MockProvider {
        async fn ping(&self) -> Result<bool, SearchGatewayError> {
            self.ping.clone()
        }

        async fn index_exists(&self, _index: &str) -> Result<bool, SearchGatewayError> {
            Ok(self.existing_index)
        }

        async fn create_index(
            &self,
            index: &str,
            definition: &IndexDefinition,
        ) -> Result<(), SearchGatewayError> {
            if let Some(e) = &self.create_error {
                return Err(e.clone());
            }
            self.created_indices
                .lock()
                .await
                .push((index.to_string(), definition.clone()));
            Ok(())
        }

        async fn index_document(
            &self,
            _index: &str,
            document_id: &str,
            document: &Document,
        ) -> Result<String, SearchGatewayError> {
            self.indexed
                .lock()
                .await
                .push((document_id.to_string(), document.clone()));
            Ok(document_id.to_string())
        }

        async fn bulk(
            &self,
            _index: &str,
            operations: &[BulkOperation],
        ) -> Result<Vec<BulkItemOutcome>, SearchGatewayError> {
            self.bulk_requests.lock().await.push(operations.to_vec());
            Ok(operations
                .iter()
                .map(|op| {
                    let rejected = self.reject_ids.iter().any(|id| id == op.id());
                    BulkItemOutcome {
                        action: op.action(),
                        id: Some(op.id().to_string()),
                        status: if rejected { 400 } else { 201 },
                        error: rejected.then(|| BulkItemError {
                            error_type: "mapper_parsing_exception".to_string(),
                            reason: "failed to parse field [title]".to_string(),
                        }),
                    }
                })
                .collect())
        }

        async fn find_by_field(
            &self,
            _index: &str,
            _field: &str,
            value: &Value,
        ) -> Result<Vec<SearchHit>, SearchGatewayError> {
            Ok(Document::key_for(value)
                .and_then(|key| self.first_hits.get(&key).cloned())
                .into_iter()
                .collect())
        }

        async fn find_first_by_field_many(
            &self,
            _index: &str,
            _field: &str,
            values: &[Value],
        ) -> Result<Vec<Option<SearchHit>>, SearchGatewayError> {
            self.msearch_requests.lock().await.push(values.to_vec());
            Ok(values
                .iter()
                .map(|value| {
                    Document::key_for(value).and_then(|key| self.first_hits.get(&key).cloned())
                })
                .collect())
        }

        async fn search_all(
            &self,
            _index: &str,
            offset: u64,
            limit: u64,
        ) -> Result<Option<HitsPage>, SearchGatewayError> {
            self.searches.lock().await.push((offset, limit));
            Ok(self.listing.clone())
        }

        async fn find_by_document_id(
            &self,
            _index: &str,
            document_id: &str,
        ) -> Result<Option<SearchHit>, SearchGatewayError> {
            Ok(self
                .first_hits
                .values()
                .find(|hit| hit.id == document_id)
                .cloned())
        }
    }

    fn article(id: impl Into<Value>, title: &str) -> Document {
        Document::new().with_field("id", id).with_field("title", title)
    }

    #[tokio::test]
    async fn test_check_connectivity() {
        let service = SearchGateway::new(Arc::new(MockProvider::new()));
        assert_eq!(
            service.check_connectivity().await.unwrap(),
            ConnectivityStatus::Connected
        );

        let mut provider = MockProvider::new();
        provider.ping = Ok(false);
        let service = SearchGateway::new(Arc::new(provider));
        assert_eq!(
            service.check_connectivity().await.unwrap(),
            ConnectivityStatus::Unreachable
        );

        let mut provider = MockProvider::new();
        provider.ping = Err(SearchGatewayError::transport("connection refused"));
        let service = SearchGateway::new(Arc::new(provider));
        assert!(matches!(
            service.check_connectivity().await,
            Err(SearchGatewayError::TransportError(_))
        ));
    }

    #[tokio::test]
    async fn test_create_index_uses_default_definition() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        service.create_index("articles", None).await.unwrap();

        let created = provider.created_indices.lock().await;
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].0, "articles");
        assert_eq!(created[0].1, IndexDefinition::default());
    }

    #[tokio::test]
    async fn test_create_index_propagates_rejection() {
        let mut provider = MockProvider::new();
        provider.create_error = Some(SearchGatewayError::request(400, "bad mapping"));
        let service = SearchGateway::new(Arc::new(provider));

        let result = service.create_index("articles", None).await;
        assert!(matches!(
            result,
            Err(SearchGatewayError::RequestError { status: 400, .. })
        ));
    }

    #[tokio::test]
    async fn test_create_index_rejects_invalid_name() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let result = service.create_index("Articles", None).await;

        assert!(matches!(result, Err(SearchGatewayError::ValidationError(_))));
        assert!(provider.created_indices.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_ensure_index_exists() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());
        assert!(service.ensure_index_exists("articles").await.unwrap());

        let mut existing = MockProvider::new();
        existing.existing_index = true;
        let service = SearchGateway::new(Arc::new(existing));
        assert!(!service.ensure_index_exists("articles").await.unwrap());

        let mut racing = MockProvider::new();
        racing.create_error = Some(SearchGatewayError::request(
            400,
            "create_index failed: {\"error\":{\"type\":\"resource_already_exists_exception\"}}",
        ));
        let service = SearchGateway::new(Arc::new(racing));
        assert!(!service.ensure_index_exists("articles").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_document_uses_id_field() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let id = service.insert_document("articles", article(7, "A")).await.unwrap();

        assert_eq!(id, "7");
        assert_eq!(provider.indexed.lock().await[0].0, "7");
    }

    #[tokio::test]
    async fn test_insert_document_generates_id() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let id = service
            .insert_document("articles", Document::new().with_field("title", "A"))
            .await
            .unwrap();

        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[tokio::test]
    async fn test_insert_document_rejects_unusable_id() {
        let service = SearchGateway::new(Arc::new(MockProvider::new()));

        let document = Document::new().with_field("id", json!({"nested": true}));
        let result = service.insert_document("articles", document).await;

        assert!(matches!(result, Err(SearchGatewayError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_bulk_upsert_empty() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let summary = service.bulk_upsert("articles", vec![]).await.unwrap();

        assert_eq!(summary, BulkUpsertSummary::default());
        assert!(provider.msearch_requests.lock().await.is_empty());
        assert!(provider.bulk_requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_upsert_creates_new_documents() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let summary = service
            .bulk_upsert("articles", vec![article(1, "A"), article(2, "B")])
            .await
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(summary.created, 2);
        assert_eq!(summary.updated, 0);

        let bulk = provider.bulk_requests.lock().await;
        assert_eq!(bulk.len(), 1);
        assert!(bulk[0].iter().all(|op| op.action() == BulkAction::Create));
        assert_eq!(bulk[0][0].id(), "1");
        assert_eq!(bulk[0][1].id(), "2");
    }

    #[tokio::test]
    async fn test_bulk_upsert_updates_existing_at_internal_id() {
        let provider = Arc::new(MockProvider::new().with_existing("1", "internal-1"));
        let service = SearchGateway::new(provider.clone());

        let summary = service
            .bulk_upsert("articles", vec![article(1, "B"), article(2, "C")])
            .await
            .unwrap();

        assert_eq!(summary.created, 1);
        assert_eq!(summary.updated, 1);

        let bulk = provider.bulk_requests.lock().await;
        match &bulk[0][0] {
            BulkOperation::Update { id, document } => {
                assert_eq!(id, "internal-1");
                assert_eq!(document.get("title"), Some(&json!("B")));
            }
            other => panic!("expected update, got {:?}", other),
        }
        assert_eq!(bulk[0][1].action(), BulkAction::Create);
    }

    #[tokio::test]
    async fn test_bulk_upsert_single_existence_round_trip() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        service
            .bulk_upsert("articles", vec![article(1, "A"), article("1", "A2"), article(3, "C")])
            .await
            .unwrap();

        let msearch = provider.msearch_requests.lock().await;
        assert_eq!(msearch.len(), 1);
        assert_eq!(msearch[0], vec![json!(1), json!(3)]);
    }

    #[tokio::test]
    async fn test_bulk_upsert_missing_id() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        let documents = vec![article(1, "A"), Document::new().with_field("title", "no id")];
        let result = service.bulk_upsert("articles", documents).await;

        match result {
            Err(SearchGatewayError::ValidationError(message)) => {
                assert!(message.contains("position 1"))
            }
            other => panic!("expected validation error, got {:?}", other),
        }
        assert!(provider.bulk_requests.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_bulk_upsert_partial_failure_lists_every_item() {
        let mut provider = MockProvider::new();
        provider.reject_ids = vec!["2".to_string(), "3".to_string()];
        let service = SearchGateway::new(Arc::new(provider));

        let result = service
            .bulk_upsert(
                "articles",
                vec![article(1, "A"), article(2, "B"), article(3, "C")],
            )
            .await;

        let err = result.unwrap_err();
        let failures = err.bulk_failures().unwrap();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].id.as_deref(), Some("2"));
        assert_eq!(failures[0].status, 400);
        assert_eq!(failures[0].error_type, "mapper_parsing_exception");
        assert_eq!(failures[1].id.as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_batch_size_limit() {
        let config = SearchGatewayConfig::with_max_batch_size(2);
        let service = SearchGateway::with_config(Arc::new(MockProvider::new()), config);

        let documents = (0..3).map(|i| article(i, "x")).collect();
        let result = service.bulk_upsert("articles", documents).await;

        assert!(matches!(
            result,
            Err(SearchGatewayError::BatchSizeExceeded { provided: 3, max: 2 })
        ));
    }

    #[tokio::test]
    async fn test_batch_size_unlimited() {
        let service =
            SearchGateway::with_config(Arc::new(MockProvider::new()), SearchGatewayConfig::unlimited());

        let documents: Vec<Document> = (0..5000).map(|i| article(i, "x")).collect();
        let summary = service.bulk_upsert("articles", documents).await.unwrap();

        assert_eq!(summary.created, 5000);
    }

    #[tokio::test]
    async fn test_custom_id_field() {
        let provider = Arc::new(MockProvider::new());
        let config = SearchGatewayConfig::default().id_field("slug");
        let service = SearchGateway::with_config(provider.clone(), config);

        let document = Document::new().with_field("slug", "hello-world");
        service.bulk_upsert("articles", vec![document]).await.unwrap();

        assert_eq!(provider.bulk_requests.lock().await[0][0].id(), "hello-world");
    }

    #[tokio::test]
    async fn test_lookup_existing() {
        let service = SearchGateway::new(Arc::new(MockProvider::new().with_existing("1", "a")));

        assert_eq!(service.lookup_existing("articles", &json!(1)).await.unwrap().len(), 1);
        assert!(service.lookup_existing("articles", &json!(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_documents_echoes_page() {
        let mut provider = MockProvider::new();
        provider.listing = Some(HitsPage {
            total: 25,
            hits: vec![hit("a", json!({"id": 1}))],
        });
        let provider = Arc::new(provider);
        let service = SearchGateway::new(provider.clone());

        let page = service
            .list_documents("articles", PageRequest::new(3, 10))
            .await
            .unwrap()
            .found()
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.page, 3);
        assert_eq!(page.page_size, 10);
        assert_eq!(page.len(), 1);
        assert_eq!(provider.searches.lock().await[0], (20, 10));
    }

    #[tokio::test]
    async fn test_list_documents_not_found() {
        let service = SearchGateway::new(Arc::new(MockProvider::new()));
        assert_eq!(
            service
                .list_documents("articles", PageRequest::default())
                .await
                .unwrap(),
            Lookup::NotFound
        );

        let mut provider = MockProvider::new();
        provider.listing = Some(HitsPage {
            total: 3,
            hits: vec![],
        });
        let service = SearchGateway::new(Arc::new(provider));
        assert_eq!(
            service
                .list_documents("articles", PageRequest::new(9, 10))
                .await
                .unwrap(),
            Lookup::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_documents_validation() {
        let provider = Arc::new(MockProvider::new());
        let service = SearchGateway::new(provider.clone());

        for request in [PageRequest::new(0, 10), PageRequest::new(1, 0)] {
            let result = service.list_documents("articles", request).await;
            assert!(matches!(result, Err(SearchGatewayError::ValidationError(_))));
        }
        assert!(provider.searches.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_get_document() {
        let service = SearchGateway::new(Arc::new(MockProvider::new().with_existing("1", "1")));

        let found = service.get_document("articles", "1").await.unwrap();
        assert_eq!(found.found().map(|hit| hit.id), Some("1".to_string()));

        let missing = service.get_document("articles", "404").await.unwrap();
        assert_eq!(missing, Lookup::NotFound);

        assert!(matches!(
            service.get_document("articles", "").await,
            Err(SearchGatewayError::ValidationError(_))
        ));
    }
}
