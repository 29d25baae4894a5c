//! Where catalog entries come from.
//!
//! [`MovieSource`] is the seam between the store and the upstream listing;
//! [`normalize`] turns what the listing returns into [`MovieRecord`]s.

mod normalize;

use std::time::Duration;

use async_trait::async_trait;
use common::{movies, types::RawRecord, CoreError};

pub use normalize::normalize;

/// Supplies the raw most-popular titles of a year.
#[async_trait]
pub trait MovieSource: Send + Sync {
    async fn fetch(&self, year: u32) -> Result<Vec<RawRecord>, CoreError>;
}

/// Upstream listing reached over HTTP.
#[derive(Clone)]
pub struct HttpMovieSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMovieSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CoreError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Network(e.to_string()))?;
        Ok(Self { client, base_url: base_url.into() })
    }
}

#[async_trait]
impl MovieSource for HttpMovieSource {
    async fn fetch(&self, year: u32) -> Result<Vec<RawRecord>, CoreError> {
        movies::fetch_movies_for_year(&self.client, &self.base_url, year).await
    }
}
