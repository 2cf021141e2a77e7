//! Search gateway error types.
//!
//! This module defines the unified error type for all gateway operations,
//! covering transport failures, rejected requests and partially failed bulk
//! batches as well as local validation errors.

use thiserror::Error;

use crate::types::BulkItemFailure;

/// Error type reported by the cluster when an index is created twice.
const INDEX_ALREADY_EXISTS: &str = "resource_already_exists_exception";

/// Coarse classification of a `SearchGatewayError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input rejected before any request was sent.
    Validation,
    /// The cluster could not be reached.
    Transport,
    /// The cluster answered with a non-success status.
    Request,
    /// Some items of a bulk batch were rejected.
    PartialBulk,
    /// A response or request body could not be (de)serialized.
    Parse,
}

/// Unified errors from search gateway operations.
///
/// Used by the `SearchClusterProvider` trait and `SearchGateway` for all
/// operations. Every public gateway operation returns this type instead of a
/// placeholder value, so callers can always tell success from failure.
#[derive(Debug, Clone, Error)]
pub enum SearchGatewayError {
    /// Validation error (e.g., missing document id, invalid index name).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Failed to reach the search cluster (connection refused, timeout, TLS).
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The search cluster rejected the request.
    #[error("Request error (status {status}): {message}")]
    RequestError { status: u16, message: String },

    /// One or more items of a bulk request were rejected.
    #[error("Bulk request rejected {} item(s): {}", .0.len(), describe_failures(.0))]
    PartialBulkError(Vec<BulkItemFailure>),

    /// Failed to parse a response from the search cluster.
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Batch size exceeds configured maximum.
    #[error("Batch size {provided} exceeds maximum {max}")]
    BatchSizeExceeded { provided: usize, max: usize },
}

fn describe_failures(failures: &[BulkItemFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

impl SearchGatewayError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::ValidationError(msg.into())
    }

    /// Create a transport error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::TransportError(msg.into())
    }

    /// Create a request error for a non-success HTTP status.
    pub fn request(status: u16, msg: impl Into<String>) -> Self {
        Self::RequestError {
            status,
            message: msg.into(),
        }
    }

    /// Create a partial bulk failure error.
    pub fn partial_bulk(failures: Vec<BulkItemFailure>) -> Self {
        Self::PartialBulkError(failures)
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a batch size exceeded error.
    pub fn batch_size_exceeded(provided: usize, max: usize) -> Self {
        Self::BatchSizeExceeded { provided, max }
    }

    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationError(_) | Self::BatchSizeExceeded { .. } => ErrorKind::Validation,
            Self::TransportError(_) => ErrorKind::Transport,
            Self::RequestError { .. } => ErrorKind::Request,
            Self::PartialBulkError(_) => ErrorKind::PartialBulk,
            Self::ParseError(_) => ErrorKind::Parse,
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Transport failures and throttling/unavailability statuses
    /// (429, 502, 503, 504) are retryable. Everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TransportError(_) => true,
            Self::RequestError { status, .. } => matches!(status, 429 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Whether the cluster refused to create an index because it already exists.
    pub fn is_index_already_exists(&self) -> bool {
        matches!(
            self,
            Self::RequestError { status: 400, message } if message.contains(INDEX_ALREADY_EXISTS)
        )
    }

    /// Items rejected by the cluster, if this is a partial bulk failure.
    pub fn bulk_failures(&self) -> Option<&[BulkItemFailure]> {
        match self {
            Self::PartialBulkError(failures) => Some(failures),
            _ => None,
        }
    }
}
