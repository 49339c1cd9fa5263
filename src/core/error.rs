//! Typed error handling for listgate
//!
//! Every failure the framework can report is a variant of [`GateError`],
//! grouped by the layer it comes from. Each category exposes a stable
//! machine-readable code used in GraphQL `extensions.code` and HTTP bodies.
//!
//! # Error Categories
//!
//! - [`ListError`]: unknown lists, fields and items
//! - [`FilterError`]: malformed `where` clauses
//! - [`AccessError`]: operations refused by a list's access rules
//! - [`StorageError`]: adapter failures
//! - [`GraphQLError`]: query parsing and execution failures
//! - [`ConfigError`]: invalid list configuration
//!
//! # Example
//!
//! ```rust,ignore
//! match host.list("PostLimitedRead") {
//!     Ok(list) => println!("{} fields", list.fields.len()),
//!     Err(GateError::List(ListError::UnknownList { key })) => {
//!         eprintln!("no list named {}", key);
//!     }
//!     Err(e) => eprintln!("other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Message reported whenever an access rule refuses an operation
pub const ACCESS_DENIED_MESSAGE: &str = "You do not have access to this resource";

/// The main error type for listgate
#[derive(Debug, Error)]
pub enum GateError {
    #[error(transparent)]
    List(#[from] ListError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    GraphQL(#[from] GraphQLError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Internal framework errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
}

impl GateError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            GateError::List(ListError::UnknownList { .. }) => StatusCode::NOT_FOUND,
            GateError::List(ListError::ItemNotFound { .. }) => StatusCode::NOT_FOUND,
            GateError::List(_) => StatusCode::BAD_REQUEST,
            GateError::Filter(_) => StatusCode::BAD_REQUEST,
            GateError::Access(_) => StatusCode::FORBIDDEN,
            GateError::Storage(StorageError::DuplicateId { .. }) => StatusCode::CONFLICT,
            GateError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GateError::GraphQL(GraphQLError::ParseError { .. }) => StatusCode::BAD_REQUEST,
            GateError::GraphQL(_) => StatusCode::BAD_REQUEST,
            GateError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GateError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GateError::List(e) => e.error_code(),
            GateError::Filter(_) => "INVALID_FILTER",
            GateError::Access(_) => "ACCESS_DENIED",
            GateError::Storage(e) => e.error_code(),
            GateError::GraphQL(e) => e.error_code(),
            GateError::Config(_) => "CONFIG_ERROR",
            GateError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
        }
    }

    /// Shorthand for an access denial on `operation` against `list`
    pub fn access_denied(list: &str, operation: AccessOperation) -> Self {
        GateError::Access(AccessError::Denied {
            list: list.to_string(),
            operation,
        })
    }
}

impl IntoResponse for GateError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// List Errors
// =============================================================================

/// Errors related to list and item lookups
#[derive(Debug, Error)]
pub enum ListError {
    #[error("Unknown list: {key}")]
    UnknownList { key: String },

    #[error("List '{list}' has no field '{field}'")]
    UnknownField { list: String, field: String },

    #[error("{list} with id '{id}' not found")]
    ItemNotFound { list: String, id: String },

    #[error("Invalid item id '{value}': expected 24 hex characters or a 12 character string")]
    InvalidId { value: String },

    #[error("Invalid value for {list}.{field}: {message}")]
    InvalidValue {
        list: String,
        field: String,
        message: String,
    },
}

impl ListError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ListError::UnknownList { .. } => "UNKNOWN_LIST",
            ListError::UnknownField { .. } => "UNKNOWN_FIELD",
            ListError::ItemNotFound { .. } => "ITEM_NOT_FOUND",
            ListError::InvalidId { .. } => "INVALID_ID",
            ListError::InvalidValue { .. } => "INVALID_VALUE",
        }
    }
}

// =============================================================================
// Filter Errors
// =============================================================================

/// Errors raised while parsing a `where` clause
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Filter on '{list}' must be an object, got {found}")]
    NotAnObject { list: String, found: String },

    #[error("Filter on '{list}' references unknown condition '{key}'")]
    UnknownCondition { list: String, key: String },

    #[error("Condition '{key}' on '{list}' expects {expected}")]
    InvalidOperand {
        list: String,
        key: String,
        expected: &'static str,
    },

    #[error("Condition '{key}' is not supported on relationship fields")]
    RelationshipCondition { key: String },

    #[error("Invalid orderBy '{value}': expected <field>_ASC or <field>_DESC")]
    InvalidOrder { value: String },

    #[error(transparent)]
    InvalidId(#[from] ListError),
}

// =============================================================================
// Access Errors
// =============================================================================

/// Operations an access rule can govern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessOperation {
    Read,
    Create,
    Delete,
}

impl std::fmt::Display for AccessOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessOperation::Read => write!(f, "read"),
            AccessOperation::Create => write!(f, "create"),
            AccessOperation::Delete => write!(f, "delete"),
        }
    }
}

/// Errors raised when an access rule refuses an operation
#[derive(Debug, Error)]
pub enum AccessError {
    /// Rendered with the generic message so the denial does not leak whether
    /// the item exists
    #[error("You do not have access to this resource")]
    Denied {
        list: String,
        operation: AccessOperation,
    },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to list adapters
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{list} with id '{id}' already exists")]
    DuplicateId { list: String, id: String },

    #[error("{backend} adapter error: {message}")]
    Backend { backend: String, message: String },
}

impl StorageError {
    pub fn error_code(&self) -> &'static str {
        match self {
            StorageError::DuplicateId { .. } => "DUPLICATE_ID",
            StorageError::Backend { .. } => "STORAGE_ERROR",
        }
    }
}

// =============================================================================
// GraphQL Errors
// =============================================================================

/// Errors related to GraphQL parsing and execution
#[derive(Debug, Error)]
pub enum GraphQLError {
    #[error("Syntax Error: {message}")]
    ParseError { message: String },

    #[error("Must provide an operation")]
    NoOperation,

    #[error("Operation '{operation}' is not supported")]
    UnsupportedOperation { operation: String },

    #[error("Cannot query field '{field}' on type '{parent}'")]
    UnknownField { parent: String, field: String },

    #[error("Field '{field}' is missing required argument '{argument}'")]
    MissingArgument { field: String, argument: String },

    #[error("Variable '${name}' is not defined")]
    UndefinedVariable { name: String },

    #[error("Argument '{argument}' on field '{field}' expects {expected}")]
    InvalidArgument {
        field: String,
        argument: String,
        expected: &'static str,
    },

    #[error("{kind} are not supported")]
    UnsupportedSelection { kind: &'static str },
}

impl GraphQLError {
    pub fn error_code(&self) -> &'static str {
        match self {
            GraphQLError::ParseError { .. } => "GRAPHQL_PARSE_FAILED",
            GraphQLError::NoOperation => "GRAPHQL_NO_OPERATION",
            GraphQLError::UnsupportedOperation { .. } => "GRAPHQL_UNSUPPORTED_OPERATION",
            GraphQLError::UnknownField { .. } => "GRAPHQL_VALIDATION_FAILED",
            GraphQLError::MissingArgument { .. } => "GRAPHQL_VALIDATION_FAILED",
            GraphQLError::UndefinedVariable { .. } => "GRAPHQL_VALIDATION_FAILED",
            GraphQLError::InvalidArgument { .. } => "GRAPHQL_VALIDATION_FAILED",
            GraphQLError::UnsupportedSelection { .. } => "GRAPHQL_VALIDATION_FAILED",
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors found while loading or validating list configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("List '{key}' is defined more than once")]
    DuplicateList { key: String },

    #[error("List key '{key}' must be a PascalCase identifier")]
    InvalidListKey { key: String },

    #[error("Field '{list}.{field}' references unknown list '{target}'")]
    UnknownRelationshipTarget {
        list: String,
        field: String,
        target: String,
    },

    #[error("Field name '{field}' on list '{list}' is reserved")]
    ReservedField { list: String, field: String },

    #[error("Invalid {operation} access rule on '{list}': {source}")]
    InvalidAccessRule {
        list: String,
        operation: AccessOperation,
        #[source]
        source: FilterError,
    },
}

/// Result type alias for listgate operations
pub type GateResult<T> = Result<T, GateError>;
