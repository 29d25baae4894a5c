use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One catalog entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub duration: String,
    pub genre: String,
}

impl MovieRecord {
    /// Case-insensitive name comparison used for lookups and deletes.
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

/// Movies of one year, in the order they were fetched.
pub type MovieList = Vec<MovieRecord>;

/// The whole persisted mapping of year to movies.
pub type Catalog = BTreeMap<u32, MovieList>;
