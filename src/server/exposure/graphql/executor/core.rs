//! Core GraphQL executor orchestration

use graphql_parser::query::{
    Definition, Document, OperationDefinition, Selection, VariableDefinition, parse_query,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};

use super::mutation_executor;
use super::query_executor;
use super::utils;
use crate::core::error::{GateError, GateResult, GraphQLError};
use crate::server::host::ServerHost;

/// GraphQL executor that runs operations against the registered lists
pub struct GraphQLExecutor {
    host: Arc<ServerHost>,
}

/// Error entry of a GraphQL response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseError {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<Value>,
    pub extensions: ErrorExtensions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

impl ResponseError {
    pub fn new(error: &GateError, path: &[Value]) -> Self {
        Self {
            message: error.to_string(),
            path: path.to_vec(),
            extensions: ErrorExtensions {
                code: error.error_code().to_string(),
            },
        }
    }
}

/// Result of executing one GraphQL request
///
/// `data` is absent only when the request failed before execution started.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphQLResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ResponseError>,
}

impl GraphQLResponse {
    fn request_error(error: GateError) -> Self {
        tracing::debug!(error = %error, "graphql request rejected");
        Self {
            data: None,
            errors: vec![ResponseError::new(&error, &[])],
        }
    }

    pub fn into_json(self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// State shared by every resolver of a single operation
pub struct ExecutionContext<'a> {
    pub host: &'a ServerHost,
    pub variables: &'a Map<String, Value>,
    errors: Mutex<Vec<ResponseError>>,
}

impl<'a> ExecutionContext<'a> {
    fn new(host: &'a ServerHost, variables: &'a Map<String, Value>) -> Self {
        Self {
            host,
            variables,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// Record a field error; the field itself resolves to null
    pub fn record(&self, path: &[Value], error: GateError) {
        tracing::debug!(error = %error, path = ?path, "field error");
        let entry = ResponseError::new(&error, path);
        match self.errors.lock() {
            Ok(mut errors) => errors.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }

    fn into_errors(self) -> Vec<ResponseError> {
        match self.errors.into_inner() {
            Ok(errors) => errors,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[derive(Clone, Copy)]
enum OperationKind {
    Query,
    Mutation,
}

impl GraphQLExecutor {
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Execute a query without variables
    pub async fn execute(&self, query: &str) -> GraphQLResponse {
        self.execute_operation(query, Map::new(), None).await
    }

    /// Execute the selected operation of a GraphQL document
    ///
    /// With several operations in the document, `operation_name` picks one;
    /// with a single operation it may be omitted.
    pub async fn execute_operation(
        &self,
        query: &str,
        variables: Map<String, Value>,
        operation_name: Option<&str>,
    ) -> GraphQLResponse {
        let doc = match parse_query::<String>(query) {
            Ok(doc) => doc,
            Err(e) => {
                return GraphQLResponse::request_error(
                    GraphQLError::ParseError {
                        message: e.to_string(),
                    }
                    .into(),
                );
            }
        };

        let operation = match select_operation(&doc, operation_name) {
            Ok(operation) => operation,
            Err(e) => return GraphQLResponse::request_error(e),
        };

        let (kind, selections) = match operation {
            OperationDefinition::SelectionSet(set) => (OperationKind::Query, &set.items),
            OperationDefinition::Query(query) => (OperationKind::Query, &query.selection_set.items),
            OperationDefinition::Mutation(mutation) => {
                (OperationKind::Mutation, &mutation.selection_set.items)
            }
            OperationDefinition::Subscription(_) => {
                return GraphQLResponse::request_error(
                    GraphQLError::UnsupportedOperation {
                        operation: "subscription".to_string(),
                    }
                    .into(),
                );
            }
        };

        let variables = match apply_variable_defaults(variables, variable_definitions(operation)) {
            Ok(variables) => variables,
            Err(e) => return GraphQLResponse::request_error(e),
        };

        let ctx = ExecutionContext::new(&self.host, &variables);
        let data = execute_root(&ctx, selections, kind).await;

        GraphQLResponse {
            data: Some(data),
            errors: ctx.into_errors(),
        }
    }
}

fn select_operation<'d, 'q>(
    doc: &'d Document<'q, String>,
    operation_name: Option<&str>,
) -> GateResult<&'d OperationDefinition<'q, String>> {
    let mut operations = doc.definitions.iter().filter_map(|def| match def {
        Definition::Operation(op) => Some(op),
        Definition::Fragment(_) => None,
    });

    let Some(name) = operation_name else {
        return operations
            .next()
            .ok_or_else(|| GraphQLError::NoOperation.into());
    };

    operations
        .find(|op| operation_name_of(op) == Some(name))
        .ok_or_else(|| GraphQLError::NoOperation.into())
}

fn operation_name_of<'d>(operation: &'d OperationDefinition<'_, String>) -> Option<&'d str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(q) => q.name.as_deref(),
        OperationDefinition::Mutation(m) => m.name.as_deref(),
        OperationDefinition::Subscription(s) => s.name.as_deref(),
    }
}

fn variable_definitions<'d, 'q>(
    operation: &'d OperationDefinition<'q, String>,
) -> &'d [VariableDefinition<'q, String>] {
    match operation {
        OperationDefinition::Query(q) => &q.variable_definitions,
        OperationDefinition::Mutation(m) => &m.variable_definitions,
        OperationDefinition::Subscription(s) => &s.variable_definitions,
        OperationDefinition::SelectionSet(_) => &[],
    }
}

/// Fill in declared defaults for variables the request left out
fn apply_variable_defaults(
    mut variables: Map<String, Value>,
    definitions: &[VariableDefinition<'_, String>],
) -> GateResult<Map<String, Value>> {
    for definition in definitions {
        if variables.contains_key(&definition.name) {
            continue;
        }
        if let Some(default) = &definition.default_value {
            let value = utils::gql_value_to_json(default, &variables)?;
            variables.insert(definition.name.clone(), value);
        }
    }
    Ok(variables)
}

/// Resolve the root selection set
///
/// Mutation fields run one after another in document order so later fields
/// observe the writes of earlier ones.
async fn execute_root(
    ctx: &ExecutionContext<'_>,
    selections: &[Selection<'_, String>],
    kind: OperationKind,
) -> Value {
    let mut data = Map::new();

    for selection in selections {
        let Selection::Field(field) = selection else {
            ctx.record(&[], GraphQLError::UnsupportedSelection { kind: "Fragments" }.into());
            continue;
        };

        let key = utils::response_key(field).to_string();
        let path = vec![Value::String(key.clone())];

        let resolved = match kind {
            OperationKind::Query => query_executor::resolve_query_field(ctx, field, &path).await,
            OperationKind::Mutation => {
                mutation_executor::resolve_mutation_field(ctx, field, &path).await
            }
        };

        let value = resolved.unwrap_or_else(|e| {
            ctx.record(&path, e);
            Value::Null
        });
        data.insert(key, value);
    }

    Value::Object(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::access::AccessRule;
    use crate::core::list::{FieldType, ListDefinition};
    use crate::server::builder::ServerBuilder;
    use serde_json::json;

    const ALLOWED: &str = "43cg2hr9tmt3";

    async fn executor() -> GraphQLExecutor {
        let post = ListDefinition::new("PostLimitedRead").with_field("content", FieldType::text());
        let filter = post
            .parse_filter(&json!({ "id_in": [ALLOWED] }))
            .unwrap();
        let host = ServerBuilder::new()
            .create_list(
                ListDefinition::new("UserToPostLimitedRead")
                    .with_field("username", FieldType::text())
                    .with_field("posts", FieldType::to_many("PostLimitedRead")),
            )
            .create_list(post.with_read_access(AccessRule::Filter(filter)))
            .build_host()
            .unwrap();

        for (id, content) in [("gjfp463bxqtf", "a"), (ALLOWED, "b"), ("3qr8zpg7n4k6", "c")] {
            host.create_unchecked("PostLimitedRead", json!({ "id": id, "content": content }))
                .await
                .unwrap();
        }
        GraphQLExecutor::new(Arc::new(host))
    }

    #[tokio::test]
    async fn test_parse_error_has_no_data() {
        let response = executor().await.execute("{ allPostLimitedReads { id ").await;
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].extensions.code, "GRAPHQL_PARSE_FAILED");
    }

    #[tokio::test]
    async fn test_list_query_applies_read_access() {
        let response = executor()
            .await
            .execute("{ allPostLimitedReads { content } }")
            .await;
        assert!(response.errors.is_empty());
        assert_eq!(
            response.data,
            Some(json!({ "allPostLimitedReads": [{ "content": "b" }] }))
        );
    }

    #[tokio::test]
    async fn test_unknown_root_field_is_a_field_error() {
        let response = executor()
            .await
            .execute("{ allComments { id } _allPostLimitedReadsMeta { count } }")
            .await;
        let data = response.data.unwrap();
        assert_eq!(data["allComments"], Value::Null);
        assert_eq!(data["_allPostLimitedReadsMeta"], json!({ "count": 1 }));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].path, vec![json!("allComments")]);
    }

    #[tokio::test]
    async fn test_operation_name_selects_operation() {
        let query = r#"
            query First { __typename }
            query Second { count: _allPostLimitedReadsMeta { count } }
        "#;
        let exec = executor().await;

        let response = exec.execute_operation(query, Map::new(), Some("Second")).await;
        assert_eq!(response.data, Some(json!({ "count": { "count": 1 } })));

        let response = exec.execute_operation(query, Map::new(), Some("Third")).await;
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_variable_defaults_are_applied() {
        let query = r#"
            query Posts($where: PostLimitedReadWhereInput = { content: "b" }) {
                allPostLimitedReads(where: $where) { id }
            }
        "#;
        let response = executor().await.execute(query).await;
        let posts = &response.data.unwrap()["allPostLimitedReads"];
        assert_eq!(posts.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_subscriptions_are_rejected() {
        let response = executor()
            .await
            .execute("subscription { allPostLimitedReads { id } }")
            .await;
        assert!(response.data.is_none());
    }

    #[test]
    fn test_response_serialization_skips_empty_parts() {
        let response = GraphQLResponse {
            data: Some(json!({ "a": 1 })),
            errors: vec![],
        };
        assert_eq!(response.into_json(), json!({ "data": { "a": 1 } }));

        let err = GateError::from(GraphQLError::NoOperation);
        let entry = ResponseError::new(&err, &[]);
        assert_eq!(
            serde_json::to_value(entry).unwrap(),
            json!({ "message": err.to_string(), "extensions": { "code": err.error_code() } })
        );
    }
}
