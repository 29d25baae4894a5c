use client::{run_menu, CatalogClient};
use common::utils::logging::init_logging_from_env;
use dotenvy::dotenv;
use tokio::io::{stdin, stdout, BufReader};
use tracing::info;

/// `CLIENT_BASE_URL` wins; otherwise talk to the configured server address.
fn base_url() -> anyhow::Result<String> {
    if let Ok(url) = std::env::var("CLIENT_BASE_URL") {
        return Ok(url);
    }
    let cfg = configs::AppConfig::load_and_validate()?;
    Ok(format!("http://{}:{}", cfg.server.host, cfg.server.port))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_from_env();

    let base_url = base_url()?;
    info!(%base_url, "movie catalog client");
    let client = CatalogClient::new(base_url);
    run_menu(&client, BufReader::new(stdin()), stdout()).await
}
