//! ServerBuilder for fluent API to build HTTP servers

use super::host::ServerHost;
use super::registry::ListRegistry;
use super::router::build_router;
use crate::config::{ExecutorConfig, ListsConfig};
use crate::core::adapter::ListAdapter;
use crate::core::error::{GateResult, ListError};
use crate::core::list::ListDefinition;
use crate::storage::InMemoryAdapter;
use anyhow::Result;
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

/// Builder for creating servers from list definitions
///
/// Lists come from YAML configuration ([`with_config`](Self::with_config))
/// or are declared in code ([`create_list`](Self::create_list)). Lists
/// without an explicit adapter are backed by an [`InMemoryAdapter`].
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .create_list(ListDefinition::new("Post").with_field("content", FieldType::text()))
///     .build()?;
/// ```
pub struct ServerBuilder {
    configs: Vec<ListsConfig>,
    lists: Vec<ListDefinition>,
    adapters: HashMap<String, Arc<dyn ListAdapter>>,
    executor: Option<ExecutorConfig>,
    custom_routes: Vec<Router>,
    cors: Option<CorsLayer>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            configs: Vec::new(),
            lists: Vec::new(),
            adapters: HashMap::new(),
            executor: None,
            custom_routes: Vec::new(),
            cors: None,
        }
    }

    /// Add lists and executor options from a configuration
    pub fn with_config(mut self, config: ListsConfig) -> Self {
        self.configs.push(config);
        self
    }

    /// Declare a list in code
    pub fn create_list(mut self, list: ListDefinition) -> Self {
        self.lists.push(list);
        self
    }

    /// Back a list with a specific adapter instead of the in-memory default
    pub fn with_adapter(mut self, key: impl Into<String>, adapter: impl ListAdapter + 'static) -> Self {
        self.adapters.insert(key.into(), Arc::new(adapter));
        self
    }

    /// Override executor options; takes precedence over configuration files
    pub fn with_executor_config(mut self, config: ExecutorConfig) -> Self {
        self.executor = Some(config);
        self
    }

    /// Add custom routes to the server
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Apply a CORS layer to every route, e.g. `CorsLayer::permissive()` for
    /// browser clients during development
    pub fn with_cors(mut self, cors: CorsLayer) -> Self {
        self.cors = Some(cors);
        self
    }

    /// Build the transport-agnostic host
    ///
    /// Fails on invalid list definitions, duplicate keys, relationships to
    /// unknown lists and adapters registered for unknown lists.
    pub fn build_host(mut self) -> GateResult<ServerHost> {
        let merged = ListsConfig::merge(std::mem::take(&mut self.configs));
        let executor = self.executor.take().unwrap_or_else(|| merged.executor_config());

        let mut registry = ListRegistry::new();
        for list_config in &merged.lists {
            registry.register(ListDefinition::from_config(list_config)?)?;
        }
        for list in std::mem::take(&mut self.lists) {
            registry.register(list)?;
        }
        registry.validate()?;

        if let Some(key) = self.adapters.keys().find(|key| registry.get(key).is_none()) {
            return Err(ListError::UnknownList { key: key.clone() }.into());
        }

        let mut adapters = std::mem::take(&mut self.adapters);
        for key in registry.keys() {
            adapters
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(InMemoryAdapter::new(key)) as Arc<dyn ListAdapter>);
        }

        tracing::debug!(lists = registry.len(), "server host built");
        ServerHost::from_builder_components(executor, registry, adapters)
    }

    /// Build the final router
    pub fn build(mut self) -> Result<Router> {
        let custom_routes = std::mem::take(&mut self.custom_routes);
        let cors = self.cors.take();
        let host = Arc::new(self.build_host()?);

        let app = build_router(host, custom_routes);
        Ok(match cors {
            Some(cors) => app.layer(cors),
            None => app,
        })
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::{ConfigError, GateError};
    use crate::core::list::FieldType;

    const CONFIG: &str = r#"
lists:
  - key: UserToPostLimitedRead
    fields:
      username: { type: text }
      posts: { type: relationship, ref: PostLimitedRead, many: true }
  - key: PostLimitedRead
    fields:
      content: { type: text }
    access:
      read: { id_in: ["43cg2hr9tmt3"] }
"#;

    #[test]
    fn test_build_host_from_config() {
        let host = ServerBuilder::new()
            .with_config(ListsConfig::from_yaml_str(CONFIG).unwrap())
            .build_host()
            .expect("host should build");

        assert_eq!(host.list_keys(), vec!["UserToPostLimitedRead", "PostLimitedRead"]);
        assert!(host.adapter("PostLimitedRead").is_ok());
        assert!(!host.config.enforce_access_on_unfiltered_relationships);
    }

    #[test]
    fn test_executor_override_wins() {
        let host = ServerBuilder::new()
            .with_config(ListsConfig::from_yaml_str(CONFIG).unwrap())
            .with_executor_config(ExecutorConfig {
                enforce_access_on_unfiltered_relationships: true,
                ..ExecutorConfig::default()
            })
            .build_host()
            .unwrap();
        assert!(host.config.enforce_access_on_unfiltered_relationships);
    }

    #[test]
    fn test_dangling_relationship_fails() {
        let result = ServerBuilder::new()
            .create_list(ListDefinition::new("User").with_field("posts", FieldType::to_many("Post")))
            .build_host();
        assert!(matches!(
            result,
            Err(GateError::Config(ConfigError::UnknownRelationshipTarget { .. }))
        ));
    }

    #[test]
    fn test_duplicate_list_across_sources_fails() {
        let result = ServerBuilder::new()
            .with_config(ListsConfig::from_yaml_str(CONFIG).unwrap())
            .create_list(ListDefinition::new("PostLimitedRead"))
            .build_host();
        assert!(matches!(
            result,
            Err(GateError::Config(ConfigError::DuplicateList { .. }))
        ));
    }

    #[test]
    fn test_adapter_for_unknown_list_fails() {
        let result = ServerBuilder::new()
            .create_list(ListDefinition::new("Post"))
            .with_adapter("Comment", InMemoryAdapter::new("Comment"))
            .build_host();
        assert!(matches!(result, Err(GateError::List(ListError::UnknownList { .. }))));
    }

    #[tokio::test]
    async fn test_cors_layer_is_applied() {
        use axum::body::Body;
        use axum::http::{Request, header};
        use tower::ServiceExt;

        let app = ServerBuilder::new()
            .create_list(ListDefinition::new("Post"))
            .with_cors(CorsLayer::permissive())
            .build()
            .unwrap();

        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, "http://localhost:8080")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert!(response.status().is_success());
        assert!(
            response
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
    }

    #[test]
    fn test_build_router() {
        let result = ServerBuilder::new()
            .create_list(ListDefinition::new("Post").with_field("content", FieldType::text()))
            .with_custom_routes(Router::new())
            .build();
        assert!(result.is_ok());
    }
}
