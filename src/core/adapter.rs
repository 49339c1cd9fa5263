//! Storage adapter trait for lists

use crate::core::error::StorageError;
use crate::core::filter::{OrderBy, WhereFilter};
use crate::core::id::ItemId;
use crate::core::item::Item;
use async_trait::async_trait;

/// Pagination and ordering for [`ListAdapter::find`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    /// Maximum number of items to return
    pub first: Option<usize>,

    /// Number of matching items to skip
    pub skip: usize,

    /// Sort order; insertion order when absent
    pub order_by: Option<OrderBy>,
}

impl FindOptions {
    pub fn first(n: usize) -> Self {
        Self {
            first: Some(n),
            ..Self::default()
        }
    }

    /// Sort and paginate an already filtered set of items
    pub fn apply(&self, mut items: Vec<Item>) -> Vec<Item> {
        if let Some(order) = &self.order_by {
            items.sort_by(|a, b| order.compare(a, b));
        }
        items
            .into_iter()
            .skip(self.skip)
            .take(self.first.unwrap_or(usize::MAX))
            .collect()
    }
}

/// Storage backend for the items of one list
///
/// Adapters store documents and evaluate filters; they know nothing of
/// access control. Every method is a raw operation: callers that must honour
/// access rules fold them into the filter they pass in.
#[async_trait]
pub trait ListAdapter: Send + Sync {
    /// Short backend name used in logs and errors
    fn backend(&self) -> &'static str;

    /// Insert a new item; fails if the id is already taken
    async fn create(&self, item: Item) -> Result<Item, StorageError>;

    /// Fetch an item by id
    async fn get(&self, id: &ItemId) -> Result<Option<Item>, StorageError>;

    /// Items matching `filter`, sorted and paginated by `options`
    async fn find(
        &self,
        filter: &WhereFilter,
        options: &FindOptions,
    ) -> Result<Vec<Item>, StorageError>;

    /// Number of items matching `filter`
    async fn count(&self, filter: &WhereFilter) -> Result<usize, StorageError>;

    /// Remove an item, returning it if it existed
    async fn delete(&self, id: &ItemId) -> Result<Option<Item>, StorageError>;

    /// Remove every item
    async fn drop_database(&self) -> Result<(), StorageError>;
}
