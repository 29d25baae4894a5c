use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use common::{guard::{try_claim, Claim}, types::RawRecord, CoreError};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::Value;
use service::{catalog::MovieCatalog, source::MovieSource};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use server::{routes, ServerState};

fn cors() -> CorsLayer { CorsLayer::very_permissive() }

/// Upstream that answers every year with the same three titles,
/// except 1900 which fails.
struct FixedSource;

#[async_trait]
impl MovieSource for FixedSource {
    async fn fetch(&self, year: u32) -> Result<Vec<RawRecord>, CoreError> {
        if year == 1900 {
            return Err(CoreError::Network("upstream unreachable".into()));
        }
        let raw = |title: &str, runtime: &str| RawRecord {
            title: title.into(),
            title_type: None,
            metadata: vec![year.to_string(), runtime.into()],
            genres: vec!["Drama".into()],
        };
        Ok(vec![
            raw("1. Dune: Part Two", "2h 46m"),
            raw("2. Civil War", "1h 49m"),
            raw("3. Challengers", "2h 11m"),
        ])
    }
}

struct TestApp {
    base_url: String,
    addr: SocketAddr,
    catalog_path: PathBuf,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let catalog_path = std::env::temp_dir()
        .join(format!("movie_catalog_e2e_{}", Uuid::new_v4()))
        .join("movies.json");
    let state = ServerState { catalog: MovieCatalog::new(&catalog_path, Arc::new(FixedSource)) };

    let app: Router = routes::build_router(state, cors());
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, addr, catalog_path })
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.catalog_path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server().await?;
    let res = reqwest::get(format!("{}/health", app.base_url)).await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_catalog_crud_flow() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();

    // empty catalog
    let res = c.get(format!("{}/movies", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?, serde_json::json!({}));

    let res = c.get(format!("{}/movies/1800", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    // add
    let res = c.post(format!("{}/movies/2024", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::CREATED);
    let added = res.json::<Value>().await?;
    assert_eq!(added[0]["name"], "Dune: Part Two");
    assert_eq!(added[0]["type"], "Movie");
    assert_eq!(added[0]["duration"], "2h 46m");

    // second add conflicts
    let res = c.post(format!("{}/movies/2024", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], "Already Exists");

    // update upserts a new year
    let res = c.put(format!("{}/movies/2023", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);

    let all = c.get(format!("{}/movies", app.base_url)).send().await?.json::<Value>().await?;
    assert!(all.get("2023").is_some());
    assert!(all.get("2024").is_some());

    // delete the middle entry, case-insensitive, with an encoded space
    let res = c.delete(format!("{}/movies/2024/civil%20WAR", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    assert_eq!(res.json::<Value>().await?["name"], "Civil War");

    let res = c.delete(format!("{}/movies/2024/civil%20war", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);

    let left = c.get(format!("{}/movies/2024", app.base_url)).send().await?.json::<Value>().await?;
    let names: Vec<_> = left.as_array().unwrap().iter().map(|m| m["name"].clone()).collect();
    assert_eq!(names, [Value::from("Dune: Part Two"), Value::from("Challengers")]);

    // the file on disk matches what the API reports
    let on_disk: Value = serde_json::from_slice(&tokio::fs::read(&app.catalog_path).await?)?;
    assert_eq!(on_disk["2024"], left);
    Ok(())
}

#[tokio::test]
async fn e2e_upstream_failure_is_bad_gateway() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    let res = c.post(format!("{}/movies/1900", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::BAD_GATEWAY);

    let res = c.get(format!("{}/movies/1900", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn e2e_invalid_year_is_bad_request() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    for path in ["movies/0", "movies/abc", "movies/-5"] {
        let res = c.get(format!("{}/{}", app.base_url, path)).send().await?;
        assert_eq!(res.status(), HttpStatusCode::BAD_REQUEST, "{path}");
    }
    Ok(())
}

#[tokio::test]
async fn e2e_metrics_count_operations() -> anyhow::Result<()> {
    let app = start_server().await?;
    let c = reqwest::Client::new();
    c.get(format!("{}/movies", app.base_url)).send().await?;
    let body = c.get(format!("{}/metrics", app.base_url)).send().await?.text().await?;
    assert!(body.contains("movie_catalog_operations_total"));
    Ok(())
}

#[tokio::test]
async fn e2e_guard_sees_running_server() -> anyhow::Result<()> {
    let app = start_server().await?;
    let claim = try_claim(&app.addr.ip().to_string(), app.addr.port())?;
    assert_eq!(claim, Claim::AlreadyInUse);
    Ok(())
}

#[tokio::test]
async fn e2e_serve_skips_when_address_is_taken() -> anyhow::Result<()> {
    let holder = std::net::TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0))?;
    let addr = holder.local_addr()?;
    let data_dir = std::env::temp_dir().join(format!("movie_catalog_e2e_{}", Uuid::new_v4()));

    let mut cfg = configs::AppConfig::default();
    cfg.server.host = addr.ip().to_string();
    cfg.server.port = addr.port();
    cfg.storage.catalog_path = data_dir.join("movies.json").to_string_lossy().into_owned();

    // returns instead of serving forever
    tokio::time::timeout(std::time::Duration::from_secs(5), server::serve(cfg)).await??;
    // nothing was set up for a server that never started
    assert!(!data_dir.exists());
    drop(holder);
    Ok(())
}
