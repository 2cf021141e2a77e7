//! Parsing of OpenSearch response bodies.
//!
//! The functions here are pure so the response handling can be tested
//! without a running cluster.

use serde_json::{json, Value};

use search_gateway_shared::{Document, SearchHit};

use crate::errors::SearchGatewayError;
use crate::types::{BulkAction, BulkItemError, BulkItemOutcome, BulkOperation, HitsPage};

/// Build the newline-delimited bulk body: one action line per operation,
/// followed by its source line.
///
/// `create` lines carry the document itself; `update` lines wrap it as a
/// partial document (`{"doc": ...}`).
pub fn bulk_body(operations: &[BulkOperation]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(operations.len() * 2);
    for operation in operations {
        match operation {
            BulkOperation::Create { id, document } => {
                lines.push(json!({ "create": { "_id": id } }));
                lines.push(json!(document));
            }
            BulkOperation::Update { id, document } => {
                lines.push(json!({ "update": { "_id": id } }));
                lines.push(json!({ "doc": document }));
            }
        }
    }
    lines
}

/// Exact-match query used for existence lookups.
pub fn term_query(field: &str, value: &Value) -> Value {
    json!({
        "query": {
            "bool": {
                "must": [
                    { "term": { field: value } }
                ]
            }
        }
    })
}

/// Newline-delimited multi-search body with one size-1 term query per value.
pub fn existence_msearch_body(field: &str, values: &[Value]) -> Vec<Value> {
    let mut lines = Vec::with_capacity(values.len() * 2);
    for value in values {
        lines.push(json!({}));
        let mut query = term_query(field, value);
        query["size"] = json!(1);
        lines.push(query);
    }
    lines
}

/// Parse the items of a bulk response.
pub fn parse_bulk_response(body: &Value) -> Result<Vec<BulkItemOutcome>, SearchGatewayError> {
    let items = body["items"]
        .as_array()
        .ok_or_else(|| SearchGatewayError::parse("bulk response has no items array"))?;

    items.iter().map(parse_bulk_item).collect()
}

fn parse_bulk_item(item: &Value) -> Result<BulkItemOutcome, SearchGatewayError> {
    let (name, result) = item
        .as_object()
        .and_then(|map| map.iter().next())
        .ok_or_else(|| SearchGatewayError::parse(format!("malformed bulk item: {}", item)))?;

    let action = BulkAction::from_name(name)
        .ok_or_else(|| SearchGatewayError::parse(format!("unexpected bulk action '{}'", name)))?;

    let status = result["status"]
        .as_u64()
        .and_then(|s| u16::try_from(s).ok())
        .ok_or_else(|| SearchGatewayError::parse(format!("bulk item without status: {}", item)))?;

    let error = match &result["error"] {
        Value::Null => None,
        Value::String(reason) => Some(BulkItemError {
            error_type: "unknown".to_string(),
            reason: reason.clone(),
        }),
        error => Some(BulkItemError {
            error_type: error["type"].as_str().unwrap_or("unknown").to_string(),
            reason: error["reason"].as_str().unwrap_or_default().to_string(),
        }),
    };

    Ok(BulkItemOutcome {
        action,
        id: result["_id"].as_str().map(str::to_string),
        status,
        error,
    })
}

/// Mark `create` items rejected with a version conflict as written.
///
/// Only valid for a bulk request replayed after an attempt whose response
/// was lost: the conflicting document is the one that attempt created.
/// Returns the outcomes and the number of items reconciled.
pub fn accept_replayed_creates(outcomes: Vec<BulkItemOutcome>) -> (Vec<BulkItemOutcome>, usize) {
    let mut reconciled = 0;
    let outcomes = outcomes
        .into_iter()
        .map(|mut outcome| {
            if outcome.action == BulkAction::Create && outcome.status == 409 {
                outcome.status = 201;
                outcome.error = None;
                reconciled += 1;
            }
            outcome
        })
        .collect();
    (outcomes, reconciled)
}

/// Parse the hits section of a search response.
///
/// Returns `None` when the response has no `hits.hits` array.
pub fn parse_hits_page(body: &Value) -> Result<Option<HitsPage>, SearchGatewayError> {
    let Some(raw_hits) = body["hits"]["hits"].as_array() else {
        return Ok(None);
    };

    let hits = raw_hits
        .iter()
        .map(parse_hit)
        .collect::<Result<Vec<_>, _>>()?;

    // `hits.total` is an object on current clusters and a bare number on older ones.
    let total = match &body["hits"]["total"] {
        Value::Number(n) => n.as_u64(),
        total => total["value"].as_u64(),
    }
    .unwrap_or(hits.len() as u64);

    Ok(Some(HitsPage { total, hits }))
}

/// Parse the hits of a search response, treating a missing hits section as empty.
pub fn parse_hits(body: &Value) -> Result<Vec<SearchHit>, SearchGatewayError> {
    Ok(parse_hits_page(body)?.map(|page| page.hits).unwrap_or_default())
}

/// Parse a single hit.
pub fn parse_hit(hit: &Value) -> Result<SearchHit, SearchGatewayError> {
    let id = hit["_id"]
        .as_str()
        .ok_or_else(|| SearchGatewayError::parse("hit without _id"))?
        .to_string();

    let source = match &hit["_source"] {
        Value::Null => Document::new(),
        source => Document::from_value(source.clone())
            .ok_or_else(|| SearchGatewayError::parse(format!("hit {} has non-object _source", id)))?,
    };

    Ok(SearchHit {
        id,
        index: hit["_index"].as_str().unwrap_or_default().to_string(),
        score: hit["_score"].as_f64(),
        source,
    })
}

/// Parse a multi-search response into the first hit of each sub-search.
///
/// Fails if any sub-search reports an error or the number of responses does
/// not match `expected`.
pub fn parse_first_hits(
    body: &Value,
    expected: usize,
) -> Result<Vec<Option<SearchHit>>, SearchGatewayError> {
    let responses = body["responses"]
        .as_array()
        .ok_or_else(|| SearchGatewayError::parse("msearch response has no responses array"))?;

    if responses.len() != expected {
        return Err(SearchGatewayError::parse(format!(
            "msearch returned {} responses for {} queries",
            responses.len(),
            expected
        )));
    }

    responses
        .iter()
        .map(|response| {
            if !response["error"].is_null() {
                let status = response["status"]
                    .as_u64()
                    .and_then(|s| u16::try_from(s).ok())
                    .unwrap_or(500);
                return Err(SearchGatewayError::request(
                    status,
                    format!("existence lookup failed: {}", response["error"]),
                ));
            }
            Ok(parse_hits(response)?.into_iter().next())
        })
        .collect()
}

/// Extract the `_id` assigned by an index-document response.
pub fn parse_indexed_id(body: &Value) -> Result<String, SearchGatewayError> {
    body["_id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SearchGatewayError::parse("index response has no _id"))
}
