//! Field and relationship resolution for list items

use futures::future::{BoxFuture, FutureExt};
use graphql_parser::query::{Field, Selection};
use indexmap::IndexSet;
use serde_json::{Map, Value, json};

use super::core::ExecutionContext;
use super::utils;
use crate::core::adapter::FindOptions;
use crate::core::error::{AccessOperation, GateError, GateResult, GraphQLError};
use crate::core::filter::WhereFilter;
use crate::core::id::ItemId;
use crate::core::item::Item;
use crate::core::list::{FieldType, ListDefinition};

/// Type name reported for every `{ count }` meta object
pub const META_TYPE_NAME: &str = "_QueryMeta";

/// Resolve the selections for each item of a list, in order
pub fn resolve_items<'a>(
    ctx: &'a ExecutionContext<'_>,
    list: &'a ListDefinition,
    items: Vec<Item>,
    selections: &'a [Selection<'_, String>],
    path: Vec<Value>,
) -> BoxFuture<'a, Value> {
    async move {
        let mut resolved = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let mut item_path = path.clone();
            item_path.push(json!(index));
            resolved.push(resolve_item_fields(ctx, list, item, selections, item_path).await);
        }
        Value::Array(resolved)
    }
    .boxed()
}

/// Resolve the selections of a single item
///
/// A field that fails is recorded on the context and comes back as null;
/// its siblings are still resolved.
pub fn resolve_item_fields<'a>(
    ctx: &'a ExecutionContext<'_>,
    list: &'a ListDefinition,
    item: Item,
    selections: &'a [Selection<'_, String>],
    path: Vec<Value>,
) -> BoxFuture<'a, Value> {
    async move {
        let mut result = Map::new();

        for selection in selections {
            let Selection::Field(field) = selection else {
                ctx.record(&path, GraphQLError::UnsupportedSelection { kind: "Fragments" }.into());
                continue;
            };

            let key = utils::response_key(field).to_string();
            let mut field_path = path.clone();
            field_path.push(Value::String(key.clone()));

            let value = match resolve_field(ctx, list, &item, field, &field_path).await {
                Ok(value) => value,
                Err(e) => {
                    ctx.record(&field_path, e);
                    Value::Null
                }
            };
            result.insert(key, value);
        }

        Value::Object(result)
    }
    .boxed()
}

async fn resolve_field(
    ctx: &ExecutionContext<'_>,
    list: &ListDefinition,
    item: &Item,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let name = field.name.as_str();

    match name {
        "__typename" => return Ok(json!(list.key)),
        "id" => return Ok(json!(item.id.to_string())),
        _ => {}
    }

    match list.field(name) {
        Some(FieldType::Text) => Ok(item.value_of(name)),
        Some(FieldType::Relationship { target, many }) => {
            resolve_relationship(ctx, item, name, target, *many, field, path).await
        }
        None => {
            if let Some(relationship) = name.strip_prefix('_').and_then(|n| n.strip_suffix("Meta"))
                && let Some(FieldType::Relationship { target, .. }) = list.field(relationship)
            {
                let target_list = ctx.host.list(target)?;
                let caller = utils::where_arg(ctx.variables, field, target_list)?;
                let related = traverse(
                    ctx,
                    target_list,
                    item.refs(relationship),
                    caller,
                    &FindOptions::default(),
                )
                .await?;
                return resolve_meta(field, related.len());
            }

            Err(GraphQLError::UnknownField {
                parent: list.key.clone(),
                field: name.to_string(),
            }
            .into())
        }
    }
}

async fn resolve_relationship(
    ctx: &ExecutionContext<'_>,
    item: &Item,
    name: &str,
    target: &str,
    many: bool,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let target_list = ctx.host.list(target)?;
    let caller = utils::where_arg(ctx.variables, field, target_list)?;
    let options = if many {
        utils::find_options(ctx.variables, field, target_list, ctx.host.config.max_results)?
    } else {
        FindOptions::default()
    };

    let related = traverse(ctx, target_list, item.refs(name), caller, &options).await?;
    let selections = &field.selection_set.items;

    if many {
        return Ok(resolve_items(ctx, target_list, related, selections, path.to_vec()).await);
    }

    match related.into_iter().next() {
        Some(related) => {
            Ok(resolve_item_fields(ctx, target_list, related, selections, path.to_vec()).await)
        }
        None => Ok(Value::Null),
    }
}

/// Load the items an item references through a relationship
///
/// With a caller `where` (or when unfiltered traversal enforcement is
/// switched on) the target list's read rule is ANDed into the lookup. An
/// unfiltered traversal otherwise loads the stored references directly and
/// only a list-wide deny is honoured.
///
/// Both paths drop repeated references. The unfiltered path keeps stored
/// reference order; the filtered path returns store order.
pub async fn traverse(
    ctx: &ExecutionContext<'_>,
    target: &ListDefinition,
    refs: Vec<ItemId>,
    caller: Option<WhereFilter>,
    options: &FindOptions,
) -> GateResult<Vec<Item>> {
    let rule = &target.access.read;
    if rule.is_denied() {
        tracing::warn!(list = %target.key, "relationship read denied");
        return Err(GateError::access_denied(&target.key, AccessOperation::Read));
    }

    let adapter = ctx.host.adapter(&target.key)?;

    if caller.is_none() && !ctx.host.config.enforce_access_on_unfiltered_relationships {
        let unique: IndexSet<&ItemId> = refs.iter().collect();
        let mut related = Vec::with_capacity(unique.len());
        for id in unique {
            if let Some(item) = adapter.get(id).await? {
                related.push(item);
            }
        }
        tracing::debug!(
            list = %target.key,
            refs = refs.len(),
            loaded = related.len(),
            restricted = rule.is_restricted(),
            "unfiltered relationship traversal"
        );
        return Ok(options.apply(related));
    }

    let scoped = rule
        .scope(caller)
        .ok_or_else(|| GateError::access_denied(&target.key, AccessOperation::Read))?;
    let filter = WhereFilter::and([WhereFilter::id_in(&refs), scoped]);

    Ok(adapter.find(&filter, options).await?)
}

/// Resolve a `{ count }` meta selection
pub fn resolve_meta(field: &Field<'_, String>, count: usize) -> GateResult<Value> {
    let mut result = Map::new();

    for selection in &field.selection_set.items {
        let Selection::Field(meta_field) = selection else {
            return Err(GraphQLError::UnsupportedSelection { kind: "Fragments" }.into());
        };
        let value = match meta_field.name.as_str() {
            "count" => json!(count),
            "__typename" => json!(META_TYPE_NAME),
            other => {
                return Err(GraphQLError::UnknownField {
                    parent: META_TYPE_NAME.to_string(),
                    field: other.to_string(),
                }
                .into());
            }
        };
        result.insert(utils::response_key(meta_field).to_string(), value);
    }

    Ok(Value::Object(result))
}
