//! GraphQL API exposure
//!
//! Queries are parsed with `graphql-parser` and resolved by a small custom
//! executor that reads lists through their access rules.

mod executor;
mod schema_generator;

pub use executor::{ErrorExtensions, GraphQLExecutor, GraphQLResponse, ResponseError};
pub use schema_generator::SchemaGenerator;

use crate::server::host::ServerHost;
use axum::{
    Router,
    extract::{Extension, Json as AxumJson},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphQLRequestBody {
    query: String,
    #[serde(default)]
    variables: Option<Map<String, Value>>,
    #[serde(default)]
    operation_name: Option<String>,
}

/// GraphQL API exposure implementation
pub struct GraphQLExposure;

impl GraphQLExposure {
    /// Build the GraphQL router from a host
    ///
    /// Routes:
    /// - `POST /graphql`: query and mutation endpoint
    /// - `GET /graphql/schema`: generated SDL
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        Router::new()
            .route("/graphql", post(graphql_handler))
            .route("/graphql/schema", get(graphql_schema))
            .layer(Extension(host))
    }
}

/// Handler for GraphQL queries and mutations
///
/// Requests that fail before execution (syntax errors, no operation) are
/// answered with 400; everything else is 200 with any field errors listed
/// under `errors`.
async fn graphql_handler(
    Extension(host): Extension<Arc<ServerHost>>,
    AxumJson(request): AxumJson<GraphQLRequestBody>,
) -> impl IntoResponse {
    let executor = GraphQLExecutor::new(host);
    let response = executor
        .execute_operation(
            &request.query,
            request.variables.unwrap_or_default(),
            request.operation_name.as_deref(),
        )
        .await;

    let status = if response.data.is_none() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::OK
    };
    (status, AxumJson(response))
}

/// Handler for GraphQL schema SDL export
async fn graphql_schema(Extension(host): Extension<Arc<ServerHost>>) -> impl IntoResponse {
    let sdl = SchemaGenerator::new(host).generate_sdl();

    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        sdl,
    )
}
