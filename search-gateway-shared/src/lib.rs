//! # Search Gateway Shared
//!
//! This crate defines the data structures shared across the search gateway.
//! It includes the schemaless `Document`, query hits, paginated pages and the
//! `Lookup` tagged result used instead of placeholder "not found" values.

pub mod types;

pub use types::document::{Document, DEFAULT_ID_FIELD};
pub use types::page_request::PageRequest;
pub use types::search_result::{Lookup, SearchHit, SearchPage};
