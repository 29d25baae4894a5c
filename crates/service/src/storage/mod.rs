//! Storage abstractions for service layer
//!
//! File-backed stores that persist small maps as a single JSON document.

pub mod json_map_store;
