//! Server module for exposing lists over HTTP
//!
//! `ServerBuilder` turns list definitions into a [`ServerHost`], and the
//! exposures turn a host into an axum `Router`.

pub mod builder;
pub mod exposure;
pub mod host;
pub mod registry;
pub mod router;

pub use builder::ServerBuilder;
pub use exposure::GraphQLExposure;
pub use host::ServerHost;
pub use registry::{ListRegistry, RootField};
pub use router::build_router;
