//! Year-indexed movie catalog persisted as one JSON file.
//!
//! Each operation loads the file, works on the map and, for mutations,
//! writes it back before returning. Add and update of one year are
//! serialized by a per-year lock held across check, fetch and commit. The
//! store's own write lock is only taken for load, re-check and save, so a
//! slow upstream never blocks readers or work on other years.

mod model;

use std::{path::PathBuf, sync::Arc};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::ServiceError;
use crate::source::{normalize, MovieSource};
use crate::storage::json_map_store::JsonMapStore;

pub use model::{Catalog, MovieList, MovieRecord};

pub struct MovieCatalog {
    store: JsonMapStore<u32, MovieList>,
    source: Arc<dyn MovieSource>,
    year_locks: DashMap<u32, Arc<Mutex<()>>>,
}

impl MovieCatalog {
    pub fn new<P: Into<PathBuf>>(path: P, source: Arc<dyn MovieSource>) -> Arc<Self> {
        Arc::new(Self { store: JsonMapStore::new(path), source, year_locks: DashMap::new() })
    }

    /// The whole catalog; empty before the first write.
    pub async fn get_all(&self) -> Result<Catalog, ServiceError> {
        self.store.snapshot().await
    }

    pub async fn get_by_year(&self, year: u32) -> Result<MovieList, ServiceError> {
        validate_year(year)?;
        self.store
            .snapshot()
            .await?
            .remove(&year)
            .ok_or_else(|| year_not_found(year))
    }

    /// Fetch and store the movies of a year that is not in the catalog yet.
    pub async fn add_by_year(&self, year: u32) -> Result<MovieList, ServiceError> {
        validate_year(year)?;
        let year_lock = self.year_lock(year);
        let _year_guard = year_lock.lock().await;

        if self.store.snapshot().await?.contains_key(&year) {
            return Err(year_conflict(year));
        }
        let movies = self.fetch_normalized(year).await?;

        let mut txn = self.store.begin().await?;
        // another process sharing the file may have written the year meanwhile
        if txn.map.contains_key(&year) {
            return Err(year_conflict(year));
        }
        txn.map.insert(year, movies.clone());
        txn.commit().await?;
        info!(year, count = movies.len(), "added movies");
        Ok(movies)
    }

    /// Re-fetch a year and overwrite whatever is stored for it.
    pub async fn update_by_year(&self, year: u32) -> Result<MovieList, ServiceError> {
        validate_year(year)?;
        let year_lock = self.year_lock(year);
        let _year_guard = year_lock.lock().await;

        let movies = self.fetch_normalized(year).await?;

        let mut txn = self.store.begin().await?;
        let previous = txn.map.insert(year, movies.clone());
        txn.commit().await?;
        info!(
            year,
            count = movies.len(),
            replaced = previous.map_or(0, |p| p.len()),
            "updated movies"
        );
        Ok(movies)
    }

    /// Remove the first movie of `year` whose name matches, ignoring case.
    pub async fn delete_by_name(&self, year: u32, name: &str) -> Result<MovieRecord, ServiceError> {
        validate_year(year)?;
        let removed = self
            .store
            .update_map(|map| {
                let movies = map.get_mut(&year).ok_or_else(|| year_not_found(year))?;
                let idx = movies
                    .iter()
                    .position(|m| m.name_matches(name))
                    .ok_or_else(|| ServiceError::not_found(&format!("movie '{name}' in {year}")))?;
                Ok(movies.remove(idx))
            })
            .await?;
        info!(year, name = %removed.name, "deleted movie");
        Ok(removed)
    }

    fn year_lock(&self, year: u32) -> Arc<Mutex<()>> {
        self.year_locks.entry(year).or_default().clone()
    }

    async fn fetch_normalized(&self, year: u32) -> Result<MovieList, ServiceError> {
        let raw = self.source.fetch(year).await.map_err(|e| {
            warn!(year, error = %e, "upstream fetch failed");
            ServiceError::from(e)
        })?;
        Ok(raw.into_iter().map(normalize).collect())
    }
}

fn validate_year(year: u32) -> Result<(), ServiceError> {
    if year == 0 {
        return Err(ServiceError::Validation("year must be a positive integer".into()));
    }
    Ok(())
}

fn year_conflict(year: u32) -> ServiceError {
    ServiceError::Conflict(format!("movies for {year} already exist"))
}

fn year_not_found(year: u32) -> ServiceError {
    ServiceError::not_found(&format!("movies for {year}"))
}
