//! Validation helpers for the search gateway.

use search_gateway_shared::Document;

use crate::errors::SearchGatewayError;

/// Characters the cluster refuses in index names.
const FORBIDDEN_INDEX_CHARS: &[char] = &['\\', '/', '*', '?', '"', '<', '>', '|', ' ', ',', '#', ':'];

/// Maximum index name length in bytes.
const MAX_INDEX_NAME_BYTES: usize = 255;

/// Validate an index name against the cluster's naming rules.
///
/// Names must be non-empty, lowercase, at most 255 bytes, must not start
/// with `-`, `_` or `+`, must not be `.` or `..`, and must not contain any of
/// `\ / * ? " < > | , # :` or spaces.
///
/// # Example
///
/// ```
/// use search_gateway_repository::validate_index_name;
///
/// assert!(validate_index_name("articles").is_ok());
/// assert!(validate_index_name("Articles").is_err());
/// ```
pub fn validate_index_name(index: &str) -> Result<(), SearchGatewayError> {
    if index.is_empty() {
        return Err(SearchGatewayError::validation("Index name is required"));
    }
    if index == "." || index == ".." {
        return Err(SearchGatewayError::validation(format!(
            "Index name '{}' is reserved",
            index
        )));
    }
    if index.len() > MAX_INDEX_NAME_BYTES {
        return Err(SearchGatewayError::validation(format!(
            "Index name exceeds {} bytes",
            MAX_INDEX_NAME_BYTES
        )));
    }
    if index.starts_with(['-', '_', '+']) {
        return Err(SearchGatewayError::validation(format!(
            "Index name '{}' must not start with '-', '_' or '+'",
            index
        )));
    }
    if index.chars().any(|c| c.is_uppercase()) {
        return Err(SearchGatewayError::validation(format!(
            "Index name '{}' must be lowercase",
            index
        )));
    }
    if let Some(c) = index.chars().find(|c| FORBIDDEN_INDEX_CHARS.contains(c)) {
        return Err(SearchGatewayError::validation(format!(
            "Index name '{}' contains invalid character '{}'",
            index, c
        )));
    }
    Ok(())
}

/// Extract the normalised identifier of a document.
///
/// # Arguments
///
/// * `document` - The document to inspect
/// * `id_field` - Name of the identifier field
/// * `position` - Position of the document in its batch, used in the error message
///
/// # Returns
///
/// * `Ok(String)` - The identifier key
/// * `Err(SearchGatewayError::ValidationError)` - If the id is missing or not a string/number
pub fn document_key(
    document: &Document,
    id_field: &str,
    position: usize,
) -> Result<String, SearchGatewayError> {
    document.id_key(id_field).ok_or_else(|| {
        SearchGatewayError::validation(format!(
            "Document at position {} has no usable '{}' field (expected a non-empty string or a number)",
            position, id_field
        ))
    })
}
