//! Stored items
//!
//! An item is a document: an id plus a JSON map of field values.
//! Relationship fields hold hex ids, as an array for to-many fields and as a
//! single string (or null) for to-one fields.

use crate::core::error::ListError;
use crate::core::id::ItemId;
use crate::core::list::{FieldType, ListDefinition};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,

    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Item {
    /// Build an item from a raw payload as written by a list adapter
    ///
    /// An explicit `id` is honoured, otherwise one is generated. Relationship
    /// values may be given in either id form and are normalised to hex.
    /// Unknown fields are rejected. No access rule is consulted here.
    pub fn from_payload(list: &ListDefinition, payload: Value) -> Result<Self, ListError> {
        let Value::Object(mut object) = payload else {
            return Err(ListError::InvalidValue {
                list: list.key.clone(),
                field: "<item>".to_string(),
                message: "payload must be an object".to_string(),
            });
        };

        let id = match object.remove("id") {
            Some(Value::Null) | None => ItemId::new(),
            Some(value) => ItemId::from_json(&value)?,
        };

        let mut fields = Map::new();
        for (name, value) in object {
            let Some(field_type) = list.field(&name) else {
                return Err(ListError::UnknownField {
                    list: list.key.clone(),
                    field: name,
                });
            };
            let normalized = normalize_field(list, &name, field_type, value)?;
            fields.insert(name, normalized);
        }

        Ok(Self { id, fields })
    }

    /// Value of a scalar field as seen by filters; `id` is the hex form and
    /// absent fields read as null
    pub fn value_of(&self, field: &str) -> Value {
        if field == "id" {
            return Value::String(self.id.to_string());
        }
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    /// Ids stored in a relationship field, in stored order and including
    /// repeats
    pub fn refs(&self, field: &str) -> Vec<ItemId> {
        match self.fields.get(field) {
            Some(Value::Array(values)) => values
                .iter()
                .filter_map(|v| ItemId::from_json(v).ok())
                .collect(),
            Some(value @ Value::String(_)) => ItemId::from_json(value).ok().into_iter().collect(),
            _ => Vec::new(),
        }
    }

    /// JSON view of the item with `id` first
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert("id".to_string(), Value::String(self.id.to_string()));
        for (k, v) in &self.fields {
            object.insert(k.clone(), v.clone());
        }
        Value::Object(object)
    }
}

fn normalize_field(
    list: &ListDefinition,
    name: &str,
    field_type: &FieldType,
    value: Value,
) -> Result<Value, ListError> {
    let invalid = |message: &str| ListError::InvalidValue {
        list: list.key.clone(),
        field: name.to_string(),
        message: message.to_string(),
    };

    match (field_type, value) {
        (FieldType::Text, value @ (Value::String(_) | Value::Null)) => Ok(value),
        (FieldType::Text, _) => Err(invalid("expected a string")),

        (FieldType::Relationship { many: true, .. }, Value::Array(values)) => {
            let ids = values
                .iter()
                .map(|v| ItemId::from_json(v).map(|id| Value::String(id.to_string())))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(ids))
        }
        (FieldType::Relationship { many: true, .. }, Value::Null) => Ok(Value::Array(Vec::new())),
        (FieldType::Relationship { many: true, .. }, _) => Err(invalid("expected an array of ids")),

        (FieldType::Relationship { many: false, .. }, Value::Null) => Ok(Value::Null),
        (FieldType::Relationship { many: false, .. }, value) => {
            Ok(Value::String(ItemId::from_json(&value)?.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user_list() -> ListDefinition {
        ListDefinition::new("User")
            .with_field("username", FieldType::text())
            .with_field("posts", FieldType::to_many("Post"))
            .with_field("pinned", FieldType::to_one("Post"))
    }

    #[test]
    fn test_from_payload_keeps_explicit_id() {
        let item =
            Item::from_payload(&user_list(), json!({ "id": "gjfp463bxqtf", "username": "ann" }))
                .unwrap();
        assert_eq!(item.id, "gjfp463bxqtf".parse().unwrap());
        assert_eq!(item.value_of("username"), json!("ann"));
    }

    #[test]
    fn test_from_payload_generates_id() {
        let item = Item::from_payload(&user_list(), json!({ "username": "bob" })).unwrap();
        assert_eq!(item.id.to_string().len(), 24);
    }

    #[test]
    fn test_relationship_ids_are_normalized() {
        let item = Item::from_payload(
            &user_list(),
            json!({ "posts": ["43cg2hr9tmt3", "3qr8zpg7n4k6"], "pinned": "43cg2hr9tmt3" }),
        )
        .unwrap();

        let expected: Vec<ItemId> = vec![
            "43cg2hr9tmt3".parse().unwrap(),
            "3qr8zpg7n4k6".parse().unwrap(),
        ];
        assert_eq!(item.refs("posts"), expected);
        assert_eq!(item.refs("pinned"), vec![expected[0]]);
        assert_eq!(item.fields["posts"][0], json!(expected[0].to_string()));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let err = Item::from_payload(&user_list(), json!({ "email": "x" })).unwrap_err();
        assert!(matches!(err, ListError::UnknownField { .. }));
    }

    #[test]
    fn test_wrong_types_are_rejected() {
        assert!(Item::from_payload(&user_list(), json!({ "username": 3 })).is_err());
        assert!(Item::from_payload(&user_list(), json!({ "posts": "43cg2hr9tmt3" })).is_err());
        assert!(Item::from_payload(&user_list(), json!([1, 2])).is_err());
    }

    #[test]
    fn test_missing_values_read_as_null() {
        let item = Item::from_payload(&user_list(), json!({})).unwrap();
        assert_eq!(item.value_of("username"), Value::Null);
        assert!(item.refs("posts").is_empty());
        assert_eq!(item.to_json()["id"], json!(item.id.to_string()));
    }
}
