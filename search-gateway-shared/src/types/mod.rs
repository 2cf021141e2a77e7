//! This module defines the core data structures used across the search gateway.
//! It re-exports `Document`, `PageRequest` and the search result types.

pub mod document;
pub mod page_request;
pub mod search_result;

pub use document::Document;
pub use page_request::PageRequest;
pub use search_result::{Lookup, SearchHit, SearchPage};
