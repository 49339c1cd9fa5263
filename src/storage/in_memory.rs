//! In-memory list adapter for testing and development

use crate::core::adapter::{FindOptions, ListAdapter};
use crate::core::error::StorageError;
use crate::core::filter::WhereFilter;
use crate::core::id::ItemId;
use crate::core::item::Item;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory adapter for a single list
///
/// Items are kept in insertion order. Uses an async RwLock so it can be
/// shared across tasks.
#[derive(Clone)]
pub struct InMemoryAdapter {
    list: String,
    items: Arc<RwLock<IndexMap<ItemId, Item>>>,
}

impl InMemoryAdapter {
    /// Create an empty adapter for `list`
    pub fn new(list: impl Into<String>) -> Self {
        Self {
            list: list.into(),
            items: Arc::new(RwLock::new(IndexMap::new())),
        }
    }

    /// Number of stored items, ignoring any filter
    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ListAdapter for InMemoryAdapter {
    fn backend(&self) -> &'static str {
        "in-memory"
    }

    async fn create(&self, item: Item) -> Result<Item, StorageError> {
        let mut items = self.items.write().await;

        if items.contains_key(&item.id) {
            return Err(StorageError::DuplicateId {
                list: self.list.clone(),
                id: item.id.to_string(),
            });
        }

        tracing::debug!(list = %self.list, id = %item.id, "inserting item");
        items.insert(item.id, item.clone());

        Ok(item)
    }

    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StorageError> {
        let items = self.items.read().await;
        Ok(items.get(id).cloned())
    }

    async fn find(
        &self,
        filter: &WhereFilter,
        options: &FindOptions,
    ) -> Result<Vec<Item>, StorageError> {
        let items = self.items.read().await;

        let matching: Vec<Item> = items
            .values()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();

        Ok(options.apply(matching))
    }

    async fn count(&self, filter: &WhereFilter) -> Result<usize, StorageError> {
        let items = self.items.read().await;
        Ok(items.values().filter(|item| filter.matches(item)).count())
    }

    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StorageError> {
        let mut items = self.items.write().await;
        Ok(items.shift_remove(id))
    }

    async fn drop_database(&self) -> Result<(), StorageError> {
        let mut items = self.items.write().await;
        tracing::debug!(list = %self.list, dropped = items.len(), "dropping list items");
        items.clear();
        Ok(())
    }
}
