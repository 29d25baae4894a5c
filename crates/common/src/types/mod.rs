use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// One title as scraped from the upstream popularity listing.
///
/// Fields are kept close to what the listing shows; turning them into a
/// catalog entry is the job of `service::source::normalize`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    /// Display title, possibly with a rank prefix such as `"1. "`.
    pub title: String,
    #[serde(default)]
    pub title_type: Option<String>,
    /// Tokens of the info line under the title, e.g. `["2024", "2h 46m", "PG-13"]`.
    #[serde(default)]
    pub metadata: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}
