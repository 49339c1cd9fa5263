//! Router assembly

use super::exposure::GraphQLExposure;
use super::host::ServerHost;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the application router from a host
///
/// Mounts:
/// - `GET /health`, `GET /healthz`
/// - `POST /graphql`, `GET /graphql/schema`
/// - any custom routes
pub fn build_router(host: Arc<ServerHost>, custom_routes: Vec<Router>) -> Router {
    let mut app = health_routes().merge(GraphQLExposure::build_router(host));

    for custom_router in custom_routes {
        app = app.merge(custom_router);
    }

    app.layer(TraceLayer::new_for_http())
}

fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "listgate"
    }))
}
