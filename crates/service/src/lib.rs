//! Service layer for the movie catalog.
//! - `catalog`: the year-indexed store and its four operations.
//! - `source`: the upstream seam and record normalization.
//! - `storage`: the JSON file store everything persists through.

pub mod errors;
pub mod catalog;
pub mod source;
pub mod storage;
#[cfg(test)]
pub mod test_support;
