use thiserror::Error;

pub mod types;
pub mod utils;
pub mod env;
pub mod guard;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub mod movies {
    use super::*;
    use crate::types::RawRecord;

    /// Fetch the most popular titles of `year` from the upstream listing.
    ///
    /// The upstream answers `GET {base_url}/{year}` with a JSON array of
    /// [`RawRecord`]s in popularity order.
    pub async fn fetch_movies_for_year(
        client: &reqwest::Client,
        base_url: &str,
        year: u32,
    ) -> Result<Vec<RawRecord>, CoreError> {
        let url = format!("{}/{year}", base_url.trim_end_matches('/'));
        let resp = client
            .get(&url)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(CoreError::Network(format!("upstream answered {status} for {url}")));
        }
        let records = resp
            .json::<Vec<RawRecord>>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))?;
        Ok(records)
    }
}
