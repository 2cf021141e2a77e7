//! Configuration types for the SearchGateway and its cluster connection.

use std::fmt;
use std::time::Duration;

use search_gateway_shared::DEFAULT_ID_FIELD;

use crate::opensearch::IndexDefinition;
use crate::retry::RetryPolicy;

/// Default request timeout for outbound cluster calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the SearchGateway.
///
/// Controls batch limits for bulk upserts, which document field carries the
/// identifier used for create-vs-update reconciliation, and the index
/// definition used when `create_index` is called without one.
#[derive(Debug, Clone)]
pub struct SearchGatewayConfig {
    /// Maximum number of documents allowed in a single bulk upsert.
    ///
    /// Set to `None` to disable the limit (not recommended for production).
    /// Defaults to 1000 if not specified.
    pub max_batch_size: Option<usize>,

    /// Document field holding the identifier. Defaults to `"id"`.
    pub id_field: String,

    /// Index settings and mappings used when no definition is supplied.
    pub index_definition: IndexDefinition,
}

impl Default for SearchGatewayConfig {
    fn default() -> Self {
        Self {
            max_batch_size: Some(1000),
            id_field: DEFAULT_ID_FIELD.to_string(),
            index_definition: IndexDefinition::default(),
        }
    }
}

impl SearchGatewayConfig {
    /// Create a config with no batch size limit.
    ///
    /// # Warning
    ///
    /// Use with caution. Very large batches can time out on the cluster side.
    pub fn unlimited() -> Self {
        Self {
            max_batch_size: None,
            ..Self::default()
        }
    }

    /// Create a config with a custom batch size limit.
    pub fn with_max_batch_size(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: Some(max_batch_size),
            ..Self::default()
        }
    }

    /// Use a different identifier field.
    ///
    /// The default index definition gains a `keyword` mapping for the field
    /// so existence checks can match it exactly.
    pub fn id_field(mut self, id_field: impl Into<String>) -> Self {
        self.id_field = id_field.into();
        self.index_definition = self.index_definition.with_keyword_field(&self.id_field);
        self
    }

    /// Use a different default index definition.
    ///
    /// The identifier field is mapped as `keyword` unless the definition
    /// already declares it.
    pub fn index_definition(mut self, definition: IndexDefinition) -> Self {
        self.index_definition = definition.with_keyword_field(&self.id_field);
        self
    }
}

/// Basic-auth credentials for the cluster.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection settings for the search cluster.
///
/// Certificate verification is enabled unless
/// [`ConnectionConfig::danger_accept_invalid_certs`] is called.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Cluster URL (e.g. "https://localhost:9200").
    pub url: String,
    /// Optional basic-auth credentials.
    pub credentials: Option<BasicCredentials>,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
    /// Retry policy applied to every request.
    pub retry: RetryPolicy,
}

impl ConnectionConfig {
    /// Create a connection config for the given URL with default settings.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            credentials: None,
            accept_invalid_certs: false,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Authenticate with basic-auth credentials.
    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(BasicCredentials {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Disable TLS certificate verification.
    ///
    /// Only for development clusters with self-signed certificates.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.accept_invalid_certs = true;
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}
