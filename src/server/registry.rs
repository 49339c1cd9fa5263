//! Registry of list definitions
//!
//! Resolves GraphQL root field names back to the list they belong to.

use crate::core::error::ConfigError;
use crate::core::list::ListDefinition;
use indexmap::IndexMap;
use std::sync::Arc;

/// Kind of root field a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootField {
    /// `L(where: { id })`
    Item,
    /// `allLs(...)`
    List,
    /// `_allLsMeta(...)`
    Meta,
    /// `createL(data: ...)`
    Create,
    /// `deleteL(id: ...)`
    Delete,
}

/// All lists known to a server, in registration order
#[derive(Debug, Default)]
pub struct ListRegistry {
    lists: IndexMap<String, Arc<ListDefinition>>,
}

impl ListRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a list; keys must be unique
    pub fn register(&mut self, list: ListDefinition) -> Result<(), ConfigError> {
        if self.lists.contains_key(&list.key) {
            return Err(ConfigError::DuplicateList { key: list.key });
        }
        self.lists.insert(list.key.clone(), Arc::new(list));
        Ok(())
    }

    /// Check that every relationship points at a registered list
    pub fn validate(&self) -> Result<(), ConfigError> {
        for list in self.lists.values() {
            for (field, target, _) in list.relationships() {
                if !self.lists.contains_key(target) {
                    return Err(ConfigError::UnknownRelationshipTarget {
                        list: list.key.clone(),
                        field: field.to_string(),
                        target: target.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Arc<ListDefinition>> {
        self.lists.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ListDefinition>> {
        self.lists.values()
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }

    /// Resolve a query root field name
    pub fn resolve_query(&self, name: &str) -> Option<(RootField, &Arc<ListDefinition>)> {
        self.lists.values().find_map(|list| {
            if list.key == name {
                Some((RootField::Item, list))
            } else if list.list_query_name() == name {
                Some((RootField::List, list))
            } else if list.meta_query_name() == name {
                Some((RootField::Meta, list))
            } else {
                None
            }
        })
    }

    /// Resolve a mutation root field name
    pub fn resolve_mutation(&self, name: &str) -> Option<(RootField, &Arc<ListDefinition>)> {
        self.lists.values().find_map(|list| {
            if list.create_mutation_name() == name {
                Some((RootField::Create, list))
            } else if list.delete_mutation_name() == name {
                Some((RootField::Delete, list))
            } else {
                None
            }
        })
    }
}
