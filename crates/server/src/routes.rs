use axum::{routing::get, Json, Router};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

use crate::observability;
use crate::startup::ServerState;

pub mod movies;

pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

async fn metrics() -> (axum::http::StatusCode, String) {
    observability::encode_metrics()
}

/// Build the full application router: catalog CRUD plus health and metrics.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let catalog = Router::new()
        .route("/movies", get(movies::get_all))
        .route(
            "/movies/:year",
            get(movies::get_by_year)
                .post(movies::add_by_year)
                .put(movies::update_by_year),
        )
        .route("/movies/:year/:name", axum::routing::delete(movies::delete_by_name));

    let ops = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics));

    catalog
        .merge(ops)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                        .on_request(DefaultOnRequest::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                        // 5xx
                        .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
                )
                .layer(cors),
        )
}
