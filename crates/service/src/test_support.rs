#![cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use common::{types::RawRecord, CoreError};
use tokio::sync::Notify;

use crate::source::MovieSource;

/// Catalog path in its own temp directory, removed on drop.
pub struct TempCatalog {
    pub path: PathBuf,
}

impl TempCatalog {
    pub fn new() -> Self {
        let path = std::env::temp_dir()
            .join(format!("movie_catalog_{}", uuid::Uuid::new_v4()))
            .join("movies.json");
        Self { path }
    }

    /// Seed the catalog file with raw content.
    pub fn write(&self, content: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(&self.path, content)
    }
}

impl Drop for TempCatalog {
    fn drop(&mut self) {
        if let Some(dir) = self.path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

pub fn dune() -> RawRecord {
    StubSource::raw("1. Dune: Part Two", "2h 46m")
}

/// In-memory upstream that counts calls and can be told to fail.
#[derive(Default)]
pub struct StubSource {
    years: Mutex<HashMap<u32, Vec<RawRecord>>>,
    failure: Mutex<Option<String>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn empty() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_year(year: u32, records: Vec<RawRecord>) -> Arc<Self> {
        let stub = Self::empty();
        stub.set_year(year, records);
        stub
    }

    pub fn raw(title: &str, runtime: &str) -> RawRecord {
        RawRecord {
            title: title.into(),
            title_type: None,
            metadata: vec!["2024".into(), runtime.into()],
            genres: vec!["Drama".into()],
        }
    }

    pub fn set_year(&self, year: u32, records: Vec<RawRecord>) {
        self.years.lock().unwrap().insert(year, records);
    }

    pub fn fail_with(&self, msg: &str) {
        *self.failure.lock().unwrap() = Some(msg.to_string());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MovieSource for StubSource {
    async fn fetch(&self, year: u32) -> Result<Vec<RawRecord>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // yield so concurrent callers get a chance to interleave
        tokio::task::yield_now().await;
        if let Some(msg) = self.failure.lock().unwrap().clone() {
            return Err(CoreError::Network(msg));
        }
        Ok(self.years.lock().unwrap().get(&year).cloned().unwrap_or_default())
    }
}

/// Upstream whose fetch announces itself on `entered` and then waits for
/// `release` before answering with a single title.
#[derive(Default)]
pub struct GatedSource {
    pub entered: Notify,
    pub release: Notify,
}

impl GatedSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

#[async_trait]
impl MovieSource for GatedSource {
    async fn fetch(&self, _year: u32) -> Result<Vec<RawRecord>, CoreError> {
        self.entered.notify_one();
        self.release.notified().await;
        Ok(vec![dune()])
    }
}
