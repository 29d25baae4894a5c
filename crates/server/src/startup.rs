use std::{path::PathBuf, sync::Arc, time::Duration};

use common::{
    env::ensure_data_dir,
    guard::{try_claim, Claim},
};
use configs::AppConfig;
use dotenvy::dotenv;
use service::{catalog::MovieCatalog, source::HttpMovieSource};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::routes;

#[derive(Clone)]
pub struct ServerState {
    pub catalog: Arc<MovieCatalog>,
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Public entry: load `.env` and the config, then [`serve`].
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_and_validate()?;
    serve(cfg).await
}

/// Claim the configured address, then serve until Ctrl-C.
///
/// Returns `Ok(())` without serving when another listener already owns the
/// address.
pub async fn serve(cfg: AppConfig) -> anyhow::Result<()> {
    let (host, port) = (cfg.server.host.clone(), cfg.server.port);

    if try_claim(&host, port)? == Claim::AlreadyInUse {
        warn!(%host, port, "server is already running on this address; not starting another");
        return Ok(());
    }

    let catalog_path = PathBuf::from(&cfg.storage.catalog_path);
    ensure_data_dir(&catalog_path).await?;

    let source = HttpMovieSource::new(
        cfg.upstream.base_url.clone(),
        Duration::from_secs(cfg.upstream.timeout_secs),
    )?;
    let state = ServerState { catalog: MovieCatalog::new(&catalog_path, Arc::new(source)) };
    let app = routes::build_router(state, build_cors());

    let listener = tokio::net::TcpListener::bind((host.as_str(), port)).await?;
    info!(addr = %listener.local_addr()?, catalog = %catalog_path.display(), "starting movie catalog server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for ctrl-c; running until killed");
        std::future::pending::<()>().await;
    }
}
