//! OpenSearch index settings and mappings.
//!
//! This module defines the index definition sent when an index is created.

use serde_json::{json, Value};

use search_gateway_shared::DEFAULT_ID_FIELD;

/// Default number of primary shards.
pub const DEFAULT_NUMBER_OF_SHARDS: u32 = 1;

/// Default number of replicas.
pub const DEFAULT_NUMBER_OF_REPLICAS: u32 = 0;

/// Settings and mappings for a new index.
///
/// The default definition creates a single-shard index without replicas,
/// maps the `id` field as `keyword` and `title`/`content` as full-text
/// fields. Other fields are mapped dynamically by the cluster.
///
/// The identifier field must be a `keyword`: existence checks use an exact
/// `term` query, which never matches the analyzed tokens of a `text` field.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    /// Number of primary shards.
    pub number_of_shards: u32,
    /// Number of replicas per shard.
    pub number_of_replicas: u32,
    /// The `mappings` object sent with the create-index request.
    pub mappings: Value,
}

impl Default for IndexDefinition {
    fn default() -> Self {
        Self {
            number_of_shards: DEFAULT_NUMBER_OF_SHARDS,
            number_of_replicas: DEFAULT_NUMBER_OF_REPLICAS,
            mappings: default_mappings(),
        }
    }
}

impl IndexDefinition {
    /// Create a definition with custom mappings and default sharding.
    pub fn with_mappings(mappings: Value) -> Self {
        Self {
            mappings,
            ..Self::default()
        }
    }

    /// Map `field` as `keyword` unless the mappings already declare it.
    ///
    /// # Example
    ///
    /// ```
    /// use search_gateway_repository::IndexDefinition;
    ///
    /// let definition = IndexDefinition::default().with_keyword_field("slug");
    /// assert_eq!(definition.field_type("slug"), Some("keyword"));
    /// ```
    pub fn with_keyword_field(mut self, field: &str) -> Self {
        if self.field_type(field).is_some() {
            return self;
        }
        if !self.mappings.is_object() {
            self.mappings = json!({});
        }
        if !self.mappings["properties"].is_object() {
            self.mappings["properties"] = json!({});
        }
        self.mappings["properties"][field] = json!({ "type": "keyword" });
        self
    }

    /// The declared type of a top-level field, if any.
    pub fn field_type(&self, field: &str) -> Option<&str> {
        self.mappings["properties"][field]["type"].as_str()
    }

    /// Set shard and replica counts.
    pub fn shards(mut self, number_of_shards: u32, number_of_replicas: u32) -> Self {
        self.number_of_shards = number_of_shards;
        self.number_of_replicas = number_of_replicas;
        self
    }

    /// The create-index request body.
    pub fn to_body(&self) -> Value {
        json!({
            "settings": {
                "number_of_shards": self.number_of_shards,
                "number_of_replicas": self.number_of_replicas
            },
            "mappings": self.mappings
        })
    }
}

/// Mappings used by the default index definition.
///
/// - **id**: exact-match identifier
/// - **title**: full-text field
/// - **content**: full-text field
pub fn default_mappings() -> Value {
    json!({
        "properties": {
            DEFAULT_ID_FIELD: {
                "type": "keyword"
            },
            "title": {
                "type": "text"
            },
            "content": {
                "type": "text"
            }
        }
    })
}
