//! Create-vs-update reconciliation for bulk upserts.

use std::collections::{HashMap, HashSet};

use serde_json::Value;

use search_gateway_shared::Document;

use crate::types::BulkOperation;

/// A document paired with its normalised identifier key.
#[derive(Debug, Clone)]
pub struct KeyedDocument {
    pub key: String,
    pub document: Document,
}

/// Distinct identifier values to look up, in first-seen order.
///
/// Documents whose ids normalise to the same key (`1` and `"1"`) are looked
/// up once, using the raw value of the first occurrence.
pub fn distinct_lookup_values(documents: &[KeyedDocument], id_field: &str) -> Vec<(String, Value)> {
    let mut seen = HashSet::new();
    documents
        .iter()
        .filter(|doc| seen.insert(doc.key.clone()))
        .filter_map(|doc| {
            doc.document
                .id_value(id_field)
                .map(|value| (doc.key.clone(), value.clone()))
        })
        .collect()
}

/// The bulk operations planned for one upsert call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertPlan {
    pub operations: Vec<BulkOperation>,
    pub created: usize,
    pub updated: usize,
}

impl UpsertPlan {
    /// Plan one operation per document, in input order.
    ///
    /// # Arguments
    ///
    /// * `documents` - Documents with their identifier keys
    /// * `existing` - Identifier key to internal `_id` of the first matching
    ///   document already in the index
    ///
    /// A document without an existing match becomes a `create` addressed at
    /// its own key. A document with a match becomes an `update` addressed at
    /// the match's `_id`, carrying only that document. A key repeated within
    /// the batch is created once; later occurrences update the same `_id`.
    pub fn build(documents: Vec<KeyedDocument>, existing: &HashMap<String, String>) -> Self {
        let mut plan = UpsertPlan {
            operations: Vec::with_capacity(documents.len()),
            ..Default::default()
        };
        let mut created_in_batch: HashSet<String> = HashSet::new();

        for KeyedDocument { key, document } in documents {
            let target = existing
                .get(&key)
                .cloned()
                .or_else(|| created_in_batch.contains(&key).then(|| key.clone()));

            match target {
                Some(id) => {
                    plan.operations.push(BulkOperation::Update { id, document });
                    plan.updated += 1;
                }
                None => {
                    created_in_batch.insert(key.clone());
                    plan.operations.push(BulkOperation::Create { id: key, document });
                    plan.created += 1;
                }
            }
        }

        plan
    }
}
