//! Document types for the search gateway.
//!
//! A document is an arbitrary JSON object. The only field the gateway
//! interprets is the identifier field (`id` by default), which decides
//! between create and update during bulk upserts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the identifier field used when none is configured.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Schemaless document stored in the search cluster.
///
/// Serializes transparently as the underlying JSON object, so a `Document`
/// can be sent to the cluster as-is.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a document from a JSON value.
    ///
    /// Returns `None` when the value is not a JSON object.
    ///
    /// # Example
    ///
    /// ```
    /// use search_gateway_shared::Document;
    /// use serde_json::json;
    ///
    /// let doc = Document::from_value(json!({"id": 1, "title": "A"})).unwrap();
    /// assert_eq!(doc.id_key("id"), Some("1".to_string()));
    /// ```
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self { fields }),
            _ => None,
        }
    }

    /// Set a field, returning the document for chaining.
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Get a field value by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Borrow the underlying JSON object.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Raw identifier value stored under `id_field`.
    pub fn id_value(&self, id_field: &str) -> Option<&Value> {
        self.fields.get(id_field)
    }

    /// Identifier normalised to a string key.
    ///
    /// Strings are used verbatim and numbers are rendered in decimal, so
    /// `"1"` and `1` identify the same document. Any other JSON type (or an
    /// empty string) has no key.
    pub fn id_key(&self, id_field: &str) -> Option<String> {
        self.id_value(id_field).and_then(Self::key_for)
    }

    /// Normalise a JSON identifier value into a string key.
    pub fn key_for(value: &Value) -> Option<String> {
        match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Consume the document and return it as a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}
