//! Query execution logic for GraphQL

use graphql_parser::query::Field;
use serde_json::{Value, json};

use super::core::ExecutionContext;
use super::field_resolver::{resolve_item_fields, resolve_items, resolve_meta};
use super::utils;
use crate::core::adapter::FindOptions;
use crate::core::error::{AccessOperation, GateError, GateResult, GraphQLError};
use crate::server::registry::RootField;

/// Resolve a root field of a query
pub async fn resolve_query_field(
    ctx: &ExecutionContext<'_>,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let name = field.name.as_str();
    if name == "__typename" {
        return Ok(json!("Query"));
    }

    let Some((kind, list)) = ctx.host.registry.resolve_query(name) else {
        return Err(GraphQLError::UnknownField {
            parent: "Query".to_string(),
            field: name.to_string(),
        }
        .into());
    };

    tracing::debug!(field = %name, list = %list.key, kind = ?kind, "resolving query field");

    let adapter = ctx.host.adapter(&list.key)?;
    let rule = &list.access.read;
    let denied = || {
        tracing::warn!(list = %list.key, operation = "read", "access denied");
        GateError::access_denied(&list.key, AccessOperation::Read)
    };

    match kind {
        RootField::Item => {
            let where_value =
                utils::get_arg(ctx.variables, field, "where")?.ok_or_else(|| {
                    GraphQLError::MissingArgument {
                        field: name.to_string(),
                        argument: "where".to_string(),
                    }
                })?;
            let caller = list.parse_filter(&where_value)?;
            let scoped = rule.scope(Some(caller)).ok_or_else(denied)?;

            let found = adapter.find(&scoped, &FindOptions::first(1)).await?;
            match found.into_iter().next() {
                Some(item) => Ok(resolve_item_fields(
                    ctx,
                    list,
                    item,
                    &field.selection_set.items,
                    path.to_vec(),
                )
                .await),
                // A restricted list cannot tell "hidden" from "missing"; both are denials.
                None if rule.is_restricted() => Err(denied()),
                None => Ok(Value::Null),
            }
        }
        RootField::List => {
            let caller = utils::where_arg(ctx.variables, field, list)?;
            let options =
                utils::find_options(ctx.variables, field, list, ctx.host.config.max_results)?;
            let scoped = rule.scope(caller).ok_or_else(denied)?;

            let items = adapter.find(&scoped, &options).await?;
            Ok(resolve_items(ctx, list, items, &field.selection_set.items, path.to_vec()).await)
        }
        RootField::Meta => {
            let caller = utils::where_arg(ctx.variables, field, list)?;
            let scoped = rule.scope(caller).ok_or_else(denied)?;

            let count = adapter.count(&scoped).await?;
            resolve_meta(field, count)
        }
        RootField::Create | RootField::Delete => Err(GateError::Internal(format!(
            "mutation field '{}' resolved as a query",
            name
        ))),
    }
}
