//! Server host for transport-agnostic API exposure
//!
//! `ServerHost` holds everything an exposure needs to serve requests: the
//! list registry, one adapter per list and the executor options. It is the
//! single source of truth for application state.

use crate::config::ExecutorConfig;
use crate::core::adapter::ListAdapter;
use crate::core::error::{GateResult, ListError};
use crate::core::item::Item;
use crate::core::list::ListDefinition;
use crate::server::registry::ListRegistry;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Host context containing all framework state
///
/// # Example
///
/// ```rust,ignore
/// let host = Arc::new(
///     ServerBuilder::new()
///         .with_config(ListsConfig::from_yaml_file("lists.yaml")?)
///         .build_host()?,
/// );
///
/// // Seed a fixture without going through access control
/// host.create_unchecked("PostLimitedRead", json!({ "content": "hi" })).await?;
///
/// let app = build_router(host, vec![]);
/// ```
pub struct ServerHost {
    /// Executor options
    pub config: Arc<ExecutorConfig>,

    /// All registered lists
    pub registry: Arc<ListRegistry>,

    /// Adapter per list key
    adapters: HashMap<String, Arc<dyn ListAdapter>>,
}

impl ServerHost {
    /// Build the host from builder components
    ///
    /// Every registered list must have an adapter.
    pub fn from_builder_components(
        config: ExecutorConfig,
        registry: ListRegistry,
        adapters: HashMap<String, Arc<dyn ListAdapter>>,
    ) -> GateResult<Self> {
        for key in registry.keys() {
            if !adapters.contains_key(key) {
                return Err(crate::core::error::GateError::Internal(format!(
                    "no adapter registered for list '{}'",
                    key
                )));
            }
        }

        Ok(Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            adapters,
        })
    }

    /// Get a list definition by key
    pub fn list(&self, key: &str) -> GateResult<&Arc<ListDefinition>> {
        self.registry.get(key).ok_or_else(|| {
            ListError::UnknownList {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Get the adapter backing a list
    pub fn adapter(&self, key: &str) -> GateResult<&Arc<dyn ListAdapter>> {
        self.adapters.get(key).ok_or_else(|| {
            ListError::UnknownList {
                key: key.to_string(),
            }
            .into()
        })
    }

    /// Insert an item straight into a list's adapter
    ///
    /// Skips access control entirely; meant for fixtures and migrations,
    /// where the normal write path would itself be subject to the rules
    /// being set up.
    pub async fn create_unchecked(&self, key: &str, payload: Value) -> GateResult<Item> {
        let list = self.list(key)?;
        let item = Item::from_payload(list, payload)?;
        let created = self.adapter(key)?.create(item).await?;
        tracing::debug!(list = %key, id = %created.id, "item created without access checks");
        Ok(created)
    }

    /// Clear every list
    pub async fn drop_database(&self) -> GateResult<()> {
        for (key, adapter) in &self.adapters {
            adapter.drop_database().await?;
            tracing::debug!(list = %key, backend = adapter.backend(), "list dropped");
        }
        Ok(())
    }

    /// Keys of the registered lists
    pub fn list_keys(&self) -> Vec<&str> {
        self.registry.keys().collect()
    }
}
