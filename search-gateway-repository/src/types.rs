//! Request and response types for search gateway operations.

use std::fmt;

use search_gateway_shared::{Document, SearchHit};

/// Bulk action kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    /// Create a new document; fails if the identifier is taken.
    Create,
    /// Partially update an existing document.
    Update,
}

impl BulkAction {
    /// The action name used in bulk request and response bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Create => "create",
            BulkAction::Update => "update",
        }
    }

    /// Parse an action name from a bulk response item.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "create" => Some(BulkAction::Create),
            "update" => Some(BulkAction::Update),
            _ => None,
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation of a bulk request.
#[derive(Debug, Clone, PartialEq)]
pub enum BulkOperation {
    /// Create `document` under the identifier `id`.
    Create { id: String, document: Document },
    /// Merge `document` into the existing document `id` (sent as `{"doc": ...}`).
    Update { id: String, document: Document },
}

impl BulkOperation {
    /// The action this operation performs.
    pub fn action(&self) -> BulkAction {
        match self {
            BulkOperation::Create { .. } => BulkAction::Create,
            BulkOperation::Update { .. } => BulkAction::Update,
        }
    }

    /// Internal identifier the operation is addressed at.
    pub fn id(&self) -> &str {
        match self {
            BulkOperation::Create { id, .. } | BulkOperation::Update { id, .. } => id,
        }
    }
}

/// Error reported by the cluster for a single bulk item.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemError {
    /// Cluster error type (e.g. `version_conflict_engine_exception`).
    pub error_type: String,
    /// Human-readable reason.
    pub reason: String,
}

/// Result of a single item in a bulk response.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemOutcome {
    /// The action the item performed.
    pub action: BulkAction,
    /// Internal identifier, when the cluster reported one.
    pub id: Option<String>,
    /// HTTP status of the item.
    pub status: u16,
    /// Error details if the item failed.
    pub error: Option<BulkItemError>,
}

impl BulkItemOutcome {
    /// Whether the item succeeded.
    pub fn is_success(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status)
    }

    /// Convert a failed item into a `BulkItemFailure`.
    ///
    /// Returns `None` for successful items.
    pub fn into_failure(self) -> Option<BulkItemFailure> {
        if self.is_success() {
            return None;
        }
        let (error_type, reason) = match self.error {
            Some(error) => (error.error_type, error.reason),
            None => (
                "unknown".to_string(),
                format!("item returned status {}", self.status),
            ),
        };
        Some(BulkItemFailure {
            action: self.action,
            id: self.id,
            status: self.status,
            error_type,
            reason,
        })
    }
}

/// A bulk item rejected by the cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemFailure {
    /// The action that failed.
    pub action: BulkAction,
    /// Internal identifier the item was addressed at, if known.
    pub id: Option<String>,
    /// HTTP status of the item.
    pub status: u16,
    /// Cluster error type.
    pub error_type: String,
    /// Human-readable reason.
    pub reason: String,
}

impl fmt::Display for BulkItemFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} id={} status={} {}: {}",
            self.action,
            self.id.as_deref().unwrap_or("<none>"),
            self.status,
            self.error_type,
            self.reason
        )
    }
}

/// Summary of a successful bulk upsert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkUpsertSummary {
    /// Number of documents submitted.
    pub total: usize,
    /// Number of `create` operations sent.
    pub created: usize,
    /// Number of `update` operations sent.
    pub updated: usize,
}

/// Hits section of a search response.
#[derive(Debug, Clone, PartialEq)]
pub struct HitsPage {
    /// Total number of matching documents.
    pub total: u64,
    /// Returned hits, in cluster order.
    pub hits: Vec<SearchHit>,
}

/// Result of a connectivity check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    /// The cluster answered the ping successfully.
    Connected,
    /// The cluster answered, but not with a success status.
    Unreachable,
}

impl ConnectivityStatus {
    /// Returns true for `Connected`.
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectivityStatus::Connected)
    }
}

impl fmt::Display for ConnectivityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectivityStatus::Connected => f.write_str("Connected to the search cluster"),
            ConnectivityStatus::Unreachable => {
                f.write_str("Could not connect to the search cluster")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bulk_action_names() {
        assert_eq!(BulkAction::from_name("create"), Some(BulkAction::Create));
        assert_eq!(BulkAction::from_name("update"), Some(BulkAction::Update));
        assert_eq!(BulkAction::from_name("delete"), None);
        assert_eq!(BulkAction::Update.to_string(), "update");
    }

    #[test]
    fn test_outcome_success() {
        let outcome = BulkItemOutcome {
            action: BulkAction::Create,
            id: Some("1".to_string()),
            status: 201,
            error: None,
        };
        assert!(outcome.is_success());
        assert!(outcome.into_failure().is_none());
    }

    #[test]
    fn test_outcome_failure_with_error() {
        let outcome = BulkItemOutcome {
            action: BulkAction::Update,
            id: Some("abc".to_string()),
            status: 404,
            error: Some(BulkItemError {
                error_type: "document_missing_exception".to_string(),
                reason: "[abc]: document missing".to_string(),
            }),
        };
        let failure = outcome.into_failure().unwrap();
        assert_eq!(failure.action, BulkAction::Update);
        assert_eq!(failure.status, 404);
        assert_eq!(failure.error_type, "document_missing_exception");
        assert_eq!(
            failure.to_string(),
            "update id=abc status=404 document_missing_exception: [abc]: document missing"
        );
    }

    #[test]
    fn test_outcome_failure_from_status_only() {
        let outcome = BulkItemOutcome {
            action: BulkAction::Create,
            id: None,
            status: 500,
            error: None,
        };
        let failure = outcome.into_failure().unwrap();
        assert_eq!(failure.error_type, "unknown");
        assert!(failure.to_string().contains("id=<none>"));
    }

    #[test]
    fn test_connectivity_display() {
        assert!(ConnectivityStatus::Connected.is_connected());
        assert_eq!(
            ConnectivityStatus::Unreachable.to_string(),
            "Could not connect to the search cluster"
        );
    }
}
