//! Mutation execution logic for GraphQL

use graphql_parser::query::Field;
use serde_json::{Map, Value, json};

use super::core::ExecutionContext;
use super::field_resolver::resolve_item_fields;
use super::utils;
use crate::core::error::{AccessOperation, GateError, GateResult, GraphQLError, ListError};
use crate::core::id::ItemId;
use crate::core::item::Item;
use crate::core::list::{FieldType, ListDefinition};
use crate::server::registry::RootField;

/// Resolve a root field of a mutation
pub async fn resolve_mutation_field(
    ctx: &ExecutionContext<'_>,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let name = field.name.as_str();
    if name == "__typename" {
        return Ok(json!("Mutation"));
    }

    let Some((kind, list)) = ctx.host.registry.resolve_mutation(name) else {
        return Err(GraphQLError::UnknownField {
            parent: "Mutation".to_string(),
            field: name.to_string(),
        }
        .into());
    };

    match kind {
        RootField::Create => create_item(ctx, list, field, path).await,
        RootField::Delete => delete_item(ctx, list, field, path).await,
        RootField::Item | RootField::List | RootField::Meta => Err(GateError::Internal(format!(
            "query field '{}' resolved as a mutation",
            name
        ))),
    }
}

/// Create an item from `data`
///
/// A filter rule on create must match the item about to be stored.
async fn create_item(
    ctx: &ExecutionContext<'_>,
    list: &ListDefinition,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let rule = &list.access.create;
    if rule.is_denied() {
        tracing::warn!(list = %list.key, operation = "create", "access denied");
        return Err(GateError::access_denied(&list.key, AccessOperation::Create));
    }

    let data = utils::get_arg(ctx.variables, field, "data")?.unwrap_or_else(|| json!({}));
    let item = Item::from_payload(list, input_to_payload(list, data)?)?;

    if !rule.permits(&item) {
        tracing::warn!(list = %list.key, operation = "create", "item outside create rule");
        return Err(GateError::access_denied(&list.key, AccessOperation::Create));
    }

    let created = ctx.host.adapter(&list.key)?.create(item).await?;
    tracing::info!(list = %list.key, id = %created.id, "item created");

    Ok(resolve_item_fields(ctx, list, created, &field.selection_set.items, path.to_vec()).await)
}

/// Delete an item by id, returning it as it was before deletion
async fn delete_item(
    ctx: &ExecutionContext<'_>,
    list: &ListDefinition,
    field: &Field<'_, String>,
    path: &[Value],
) -> GateResult<Value> {
    let id_value = utils::get_arg(ctx.variables, field, "id")?.ok_or_else(|| {
        GraphQLError::MissingArgument {
            field: field.name.clone(),
            argument: "id".to_string(),
        }
    })?;
    let id = ItemId::from_json(&id_value)?;

    let rule = &list.access.delete;
    let adapter = ctx.host.adapter(&list.key)?;

    let existing = if rule.is_denied() {
        None
    } else {
        adapter.get(&id).await?
    };
    let Some(item) = existing.filter(|item| rule.permits(item)) else {
        tracing::warn!(list = %list.key, id = %id, operation = "delete", "access denied");
        return Err(GateError::access_denied(&list.key, AccessOperation::Delete));
    };

    adapter.delete(&id).await?;
    tracing::info!(list = %list.key, id = %id, "item deleted");

    Ok(resolve_item_fields(ctx, list, item, &field.selection_set.items, path.to_vec()).await)
}

/// Turn create input into a stored payload
///
/// Relationship inputs take the `{ connect: ... }` form: a list of
/// `{ id }` objects for to-many fields, a single one for to-one fields.
fn input_to_payload(list: &ListDefinition, data: Value) -> GateResult<Value> {
    let Value::Object(input) = data else {
        return Err(ListError::InvalidValue {
            list: list.key.clone(),
            field: "data".to_string(),
            message: "expected an input object".to_string(),
        }
        .into());
    };

    let mut payload = Map::new();
    for (name, value) in input {
        if name == "id" {
            return Err(ListError::InvalidValue {
                list: list.key.clone(),
                field: name,
                message: "ids are assigned on create".to_string(),
            }
            .into());
        }

        let value = match list.field(&name) {
            Some(FieldType::Relationship { many, .. }) => {
                connect_input(list, &name, *many, value)?
            }
            _ => value,
        };
        payload.insert(name, value);
    }

    Ok(Value::Object(payload))
}

fn connect_input(list: &ListDefinition, field: &str, many: bool, value: Value) -> GateResult<Value> {
    let invalid = |message: &str| -> GateError {
        ListError::InvalidValue {
            list: list.key.clone(),
            field: field.to_string(),
            message: message.to_string(),
        }
        .into()
    };

    let connect = match value {
        Value::Null => Value::Null,
        Value::Object(mut obj) => {
            if obj.keys().any(|key| key != "connect") {
                return Err(invalid("only `connect` is supported"));
            }
            obj.remove("connect").unwrap_or(Value::Null)
        }
        _ => return Err(invalid("expected a relationship input object")),
    };

    let unique_id = |value: &Value| -> GateResult<Value> {
        value
            .get("id")
            .filter(|id| id.is_string())
            .cloned()
            .ok_or_else(|| invalid("expected `{ id }`"))
    };

    match (many, connect) {
        (true, Value::Null) => Ok(Value::Array(Vec::new())),
        (true, Value::Array(targets)) => Ok(Value::Array(
            targets.iter().map(unique_id).collect::<GateResult<Vec<_>>>()?,
        )),
        (true, _) => Err(invalid("expected a list of `{ id }` to connect")),
        (false, Value::Null) => Ok(Value::Null),
        (false, target) => unique_id(&target),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_list() -> ListDefinition {
        ListDefinition::new("User")
            .with_field("username", FieldType::text())
            .with_field("posts", FieldType::to_many("Post"))
            .with_field("pinned", FieldType::to_one("Post"))
    }

    #[test]
    fn test_connect_inputs_become_id_refs() {
        let payload = input_to_payload(
            &user_list(),
            json!({
                "username": "a",
                "posts": { "connect": [{ "id": "gjfp463bxqtf" }, { "id": "43cg2hr9tmt3" }] },
                "pinned": { "connect": { "id": "3qr8zpg7n4k6" } },
            }),
        )
        .unwrap();

        assert_eq!(payload["posts"], json!(["gjfp463bxqtf", "43cg2hr9tmt3"]));
        assert_eq!(payload["pinned"], json!("3qr8zpg7n4k6"));
        assert_eq!(payload["username"], json!("a"));
    }

    #[test]
    fn test_null_relationship_input() {
        let payload =
            input_to_payload(&user_list(), json!({ "posts": null, "pinned": null })).unwrap();
        assert_eq!(payload["posts"], json!([]));
        assert_eq!(payload["pinned"], Value::Null);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        let list = user_list();
        for data in [
            json!("nope"),
            json!({ "id": "gjfp463bxqtf" }),
            json!({ "posts": { "create": [{ "content": "x" }] } }),
            json!({ "posts": { "connect": { "id": "gjfp463bxqtf" } } }),
            json!({ "pinned": { "connect": [{ "id": "gjfp463bxqtf" }] } }),
        ] {
            assert!(
                matches!(input_to_payload(&list, data.clone()), Err(GateError::List(_))),
                "{data} should be rejected"
            );
        }
    }
}
