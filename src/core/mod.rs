//! Core module containing the list model, filters and access rules

pub mod access;
pub mod adapter;
pub mod error;
pub mod filter;
pub mod id;
pub mod item;
pub mod list;
pub mod pluralize;

pub use access::{AccessRule, ListAccess};
pub use adapter::{FindOptions, ListAdapter};
pub use error::{GateError, GateResult};
pub use filter::{OrderBy, WhereFilter};
pub use id::ItemId;
pub use item::Item;
pub use list::{FieldType, ListDefinition};
pub use pluralize::Pluralizer;
