//! GraphQL executor module
//!
//! The executor is split into several sub-modules:
//! - `core`: operation selection, error collection and the response shape
//! - `query_executor`: item, list and meta root fields
//! - `mutation_executor`: create and delete root fields
//! - `field_resolver`: item fields and relationship traversal
//! - `utils`: argument extraction and value conversion

mod core;
mod field_resolver;
mod mutation_executor;
mod query_executor;
mod utils;

pub use core::{ErrorExtensions, GraphQLExecutor, GraphQLResponse, ResponseError};
pub use field_resolver::META_TYPE_NAME;
