//! Storage implementations for list adapters

pub mod in_memory;

pub use in_memory::InMemoryAdapter;
