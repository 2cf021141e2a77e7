//! Search result types for the search gateway.
//!
//! This module defines the structures returned from query operations.

use serde::{Deserialize, Serialize};

use super::document::Document;

/// A single document record returned by a query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Internal document identifier assigned by the cluster (`_id`).
    pub id: String,

    /// Index the hit was found in.
    pub index: String,

    /// Relevance score, absent for unscored queries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    /// The stored document.
    pub source: Document,
}

/// One page of a document listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage {
    /// Total number of documents matching the query across all pages.
    pub total: u64,

    /// Documents on this page, in cluster order.
    pub documents: Vec<SearchHit>,

    /// Echoed 1-based page number.
    pub page: u32,

    /// Echoed page size.
    pub page_size: u32,
}

impl SearchPage {
    /// Returns true if the page holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Returns the number of documents on this page.
    pub fn len(&self) -> usize {
        self.documents.len()
    }
}

/// Outcome of a query that may legitimately match nothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lookup<T> {
    /// The query matched.
    Found(T),
    /// Nothing matched.
    NotFound,
}

impl<T> Lookup<T> {
    /// Returns true for `Found`.
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    /// Convert into an `Option`.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    /// Map the found value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn hit(id: &str) -> SearchHit {
        SearchHit {
            id: id.to_string(),
            index: "articles".to_string(),
            score: Some(1.0),
            source: Document::new().with_field("id", id),
        }
    }

    #[test]
    fn test_lookup_from_option() {
        assert_eq!(Lookup::from(Some(3)), Lookup::Found(3));
        assert_eq!(Lookup::<i32>::from(None), Lookup::NotFound);
    }

    #[test]
    fn test_lookup_accessors() {
        let found = Lookup::Found(hit("1"));
        assert!(found.is_found());
        assert_eq!(found.map(|h| h.id).found(), Some("1".to_string()));

        let missing: Lookup<SearchHit> = Lookup::NotFound;
        assert!(!missing.is_found());
        assert!(missing.found().is_none());
    }

    #[test]
    fn test_lookup_serialization_is_tagged() {
        let value = serde_json::to_value(Lookup::<u32>::NotFound).unwrap();
        assert_eq!(value, json!({"status": "NOT_FOUND"}));

        let value = serde_json::to_value(Lookup::Found(7u32)).unwrap();
        assert_eq!(value, json!({"status": "FOUND", "data": 7}));
    }

    #[test]
    fn test_search_page_len() {
        let page = SearchPage {
            total: 12,
            documents: vec![hit("1"), hit("2")],
            page: 2,
            page_size: 2,
        };
        assert_eq!(page.len(), 2);
        assert!(!page.is_empty());
    }
}
