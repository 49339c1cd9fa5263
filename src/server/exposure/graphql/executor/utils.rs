//! Utility functions for GraphQL execution

use graphql_parser::query::{Field, Value as GqlValue};
use serde_json::{Map, Value, json};

use crate::core::adapter::FindOptions;
use crate::core::error::{GateResult, GraphQLError};
use crate::core::filter::{OrderBy, WhereFilter};
use crate::core::list::ListDefinition;

/// Key under which a field appears in the response (alias or name)
pub fn response_key<'f>(field: &'f Field<'_, String>) -> &'f str {
    field.alias.as_deref().unwrap_or(&field.name)
}

/// Get an argument as JSON, resolving variables
///
/// Absent arguments and explicit nulls both come back as `None`.
pub fn get_arg(
    variables: &Map<String, Value>,
    field: &Field<'_, String>,
    arg_name: &str,
) -> GateResult<Option<Value>> {
    let Some((_, value)) = field
        .arguments
        .iter()
        .find(|(name, _)| name.as_str() == arg_name)
    else {
        return Ok(None);
    };

    match gql_value_to_json(value, variables)? {
        Value::Null => Ok(None),
        other => Ok(Some(other)),
    }
}

/// Get a non-negative integer argument
pub fn get_usize_arg(
    variables: &Map<String, Value>,
    field: &Field<'_, String>,
    arg_name: &str,
) -> GateResult<Option<usize>> {
    let Some(value) = get_arg(variables, field, arg_name)? else {
        return Ok(None);
    };

    value
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| {
            GraphQLError::InvalidArgument {
                field: field.name.clone(),
                argument: arg_name.to_string(),
                expected: "a non-negative integer",
            }
            .into()
        })
}

/// Get a string argument
pub fn get_string_arg(
    variables: &Map<String, Value>,
    field: &Field<'_, String>,
    arg_name: &str,
) -> GateResult<Option<String>> {
    match get_arg(variables, field, arg_name)? {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(_) => Err(GraphQLError::InvalidArgument {
            field: field.name.clone(),
            argument: arg_name.to_string(),
            expected: "a string",
        }
        .into()),
    }
}

/// Parse the `where` argument of a field against `list`
pub fn where_arg(
    variables: &Map<String, Value>,
    field: &Field<'_, String>,
    list: &ListDefinition,
) -> GateResult<Option<WhereFilter>> {
    match get_arg(variables, field, "where")? {
        None => Ok(None),
        Some(value) => Ok(Some(list.parse_filter(&value)?)),
    }
}

/// Build pagination and ordering from `first`, `skip` and `orderBy`
///
/// `first` is capped at `max_results`; without `first` the cap still applies.
pub fn find_options(
    variables: &Map<String, Value>,
    field: &Field<'_, String>,
    list: &ListDefinition,
    max_results: usize,
) -> GateResult<FindOptions> {
    let first = get_usize_arg(variables, field, "first")?.unwrap_or(max_results);
    let skip = get_usize_arg(variables, field, "skip")?.unwrap_or(0);
    let order_by = get_string_arg(variables, field, "orderBy")?
        .map(|value| OrderBy::parse(list, &value))
        .transpose()?;

    Ok(FindOptions {
        first: Some(first.min(max_results)),
        skip,
        order_by,
    })
}

/// Convert GraphQL value to JSON, substituting variables
pub fn gql_value_to_json(
    value: &GqlValue<'_, String>,
    variables: &Map<String, Value>,
) -> GateResult<Value> {
    Ok(match value {
        GqlValue::Variable(name) => variables
            .get(name)
            .cloned()
            .ok_or_else(|| GraphQLError::UndefinedVariable { name: name.clone() })?,
        GqlValue::Null => Value::Null,
        GqlValue::Int(i) => i.as_i64().map(|n| json!(n)).unwrap_or(Value::Null),
        GqlValue::Float(f) => json!(f),
        GqlValue::String(s) => json!(s),
        GqlValue::Boolean(b) => json!(b),
        GqlValue::Enum(e) => json!(e),
        GqlValue::List(items) => Value::Array(
            items
                .iter()
                .map(|item| gql_value_to_json(item, variables))
                .collect::<GateResult<Vec<_>>>()?,
        ),
        GqlValue::Object(obj) => {
            let mut map = Map::new();
            for (k, v) in obj {
                map.insert(k.clone(), gql_value_to_json(v, variables)?);
            }
            Value::Object(map)
        }
    })
}
