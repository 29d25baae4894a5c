//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::info;

/// Ensure the directory holding the catalog file exists.
pub async fn ensure_data_dir(catalog_path: &Path) -> anyhow::Result<()> {
    let Some(dir) = catalog_path.parent().filter(|d| !d.as_os_str().is_empty()) else {
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        info!(dir = %dir.display(), "creating catalog data directory");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    Ok(())
}
