//! `where` filters
//!
//! Filters are parsed from their JSON form against a list definition, so
//! unknown fields and malformed operands are rejected before any adapter is
//! called. Id operands are normalised to their hex form during parsing.
//!
//! # Format
//!
//! ```text
//! { id: "..." }                      exact id
//! { id_in: ["...", "..."] }          id in set
//! { content_contains: "rust" }       text condition
//! { AND: [{...}, {...}] }            conjunction
//! { OR: [{...}, {...}] }             disjunction
//! ```
//!
//! Several keys in one object are ANDed together.

use crate::core::error::FilterError;
use crate::core::id::ItemId;
use crate::core::item::Item;
use crate::core::list::ListDefinition;
use serde_json::Value;
use std::cmp::Ordering;

/// Comparison applied by a single condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Not,
    In,
    NotIn,
    Contains,
    NotContains,
    StartsWith,
    NotStartsWith,
    EndsWith,
    NotEndsWith,
}

impl Operator {
    /// Key suffixes, longest first so `_not_in` wins over `_in`
    const SUFFIXES: [(&'static str, Operator); 9] = [
        ("_not_starts_with", Operator::NotStartsWith),
        ("_not_ends_with", Operator::NotEndsWith),
        ("_not_contains", Operator::NotContains),
        ("_starts_with", Operator::StartsWith),
        ("_ends_with", Operator::EndsWith),
        ("_contains", Operator::Contains),
        ("_not_in", Operator::NotIn),
        ("_not", Operator::Not),
        ("_in", Operator::In),
    ];

    /// Suffix used for this operator in filter keys
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "",
            Operator::Not => "_not",
            Operator::In => "_in",
            Operator::NotIn => "_not_in",
            Operator::Contains => "_contains",
            Operator::NotContains => "_not_contains",
            Operator::StartsWith => "_starts_with",
            Operator::NotStartsWith => "_not_starts_with",
            Operator::EndsWith => "_ends_with",
            Operator::NotEndsWith => "_not_ends_with",
        }
    }

    /// Operators available on `id`
    pub fn id_operators() -> &'static [Operator] {
        &[Operator::Eq, Operator::Not, Operator::In, Operator::NotIn]
    }

    /// Operators available on text fields
    pub fn text_operators() -> &'static [Operator] {
        &[
            Operator::Eq,
            Operator::Not,
            Operator::In,
            Operator::NotIn,
            Operator::Contains,
            Operator::NotContains,
            Operator::StartsWith,
            Operator::NotStartsWith,
            Operator::EndsWith,
            Operator::NotEndsWith,
        ]
    }

    pub fn is_set(&self) -> bool {
        matches!(self, Operator::In | Operator::NotIn)
    }

    fn is_substring(&self) -> bool {
        !matches!(
            self,
            Operator::Eq | Operator::Not | Operator::In | Operator::NotIn
        )
    }
}

/// A single `<field><suffix>: <operand>` condition
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: Operator,
    /// A single value, or an array for `_in` / `_not_in`
    pub operand: Value,
}

impl Condition {
    fn matches(&self, item: &Item) -> bool {
        let actual = item.value_of(&self.field);

        match self.op {
            Operator::Eq => actual == self.operand,
            Operator::Not => actual != self.operand,
            Operator::In => self.operand_set().contains(&actual),
            Operator::NotIn => !self.operand_set().contains(&actual),
            op => {
                let (Some(actual), Some(needle)) = (actual.as_str(), self.operand.as_str()) else {
                    // Null never satisfies a positive substring test
                    return matches!(
                        op,
                        Operator::NotContains | Operator::NotStartsWith | Operator::NotEndsWith
                    );
                };
                match op {
                    Operator::Contains => actual.contains(needle),
                    Operator::NotContains => !actual.contains(needle),
                    Operator::StartsWith => actual.starts_with(needle),
                    Operator::NotStartsWith => !actual.starts_with(needle),
                    Operator::EndsWith => actual.ends_with(needle),
                    Operator::NotEndsWith => !actual.ends_with(needle),
                    _ => false,
                }
            }
        }
    }

    fn operand_set(&self) -> &[Value] {
        self.operand.as_array().map(Vec::as_slice).unwrap_or(&[])
    }
}

/// A parsed filter tree
#[derive(Debug, Clone, PartialEq)]
pub enum WhereFilter {
    /// All children must match; an empty conjunction matches everything
    And(Vec<WhereFilter>),
    /// At least one child must match; an empty disjunction matches nothing
    Or(Vec<WhereFilter>),
    Condition(Condition),
}

impl WhereFilter {
    /// Filter matching every item
    pub fn all() -> Self {
        WhereFilter::And(Vec::new())
    }

    /// Filter matching items whose id is in `ids`
    pub fn id_in(ids: &[ItemId]) -> Self {
        WhereFilter::Condition(Condition {
            field: "id".to_string(),
            op: Operator::In,
            operand: Value::Array(ids.iter().map(|id| Value::String(id.to_string())).collect()),
        })
    }

    /// Conjunction of `filters`, flattening nested conjunctions
    pub fn and(filters: impl IntoIterator<Item = WhereFilter>) -> Self {
        let mut parts = Vec::new();
        for filter in filters {
            match filter {
                WhereFilter::And(children) => parts.extend(children),
                other => parts.push(other),
            }
        }
        if parts.len() == 1 {
            return parts.remove(0);
        }
        WhereFilter::And(parts)
    }

    /// Whether this filter matches every item
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, WhereFilter::And(children) if children.iter().all(WhereFilter::is_unrestricted))
    }

    pub fn matches(&self, item: &Item) -> bool {
        match self {
            WhereFilter::And(children) => children.iter().all(|c| c.matches(item)),
            WhereFilter::Or(children) => children.iter().any(|c| c.matches(item)),
            WhereFilter::Condition(condition) => condition.matches(item),
        }
    }

    /// Parse the JSON form of a filter against `list`
    pub fn parse(list: &ListDefinition, value: &Value) -> Result<Self, FilterError> {
        let Value::Object(object) = value else {
            return Err(FilterError::NotAnObject {
                list: list.key.clone(),
                found: value.to_string(),
            });
        };

        let mut parts = Vec::with_capacity(object.len());
        for (key, operand) in object {
            let part = match key.as_str() {
                "AND" => WhereFilter::And(parse_children(list, key, operand)?),
                "OR" => WhereFilter::Or(parse_children(list, key, operand)?),
                _ => WhereFilter::Condition(parse_condition(list, key, operand)?),
            };
            parts.push(part);
        }

        Ok(WhereFilter::and(parts))
    }
}

fn parse_children(
    list: &ListDefinition,
    key: &str,
    operand: &Value,
) -> Result<Vec<WhereFilter>, FilterError> {
    let Value::Array(children) = operand else {
        return Err(FilterError::InvalidOperand {
            list: list.key.clone(),
            key: key.to_string(),
            expected: "an array of filters",
        });
    };
    children.iter().map(|c| WhereFilter::parse(list, c)).collect()
}

fn split_key<'k>(list: &ListDefinition, key: &'k str) -> Option<(&'k str, Operator)> {
    if list.field(key).is_some() || key == "id" {
        return Some((key, Operator::Eq));
    }
    Operator::SUFFIXES.iter().find_map(|(suffix, op)| {
        let field = key.strip_suffix(suffix)?;
        (field == "id" || list.field(field).is_some()).then_some((field, *op))
    })
}

fn parse_condition(
    list: &ListDefinition,
    key: &str,
    operand: &Value,
) -> Result<Condition, FilterError> {
    let unknown = || FilterError::UnknownCondition {
        list: list.key.clone(),
        key: key.to_string(),
    };
    let invalid = |expected: &'static str| FilterError::InvalidOperand {
        list: list.key.clone(),
        key: key.to_string(),
        expected,
    };

    let (field, op) = split_key(list, key).ok_or_else(unknown)?;

    if list.field(field).is_some_and(|f| f.is_relationship()) {
        return Err(FilterError::RelationshipCondition {
            key: key.to_string(),
        });
    }

    if field == "id" {
        if !Operator::id_operators().contains(&op) {
            return Err(unknown());
        }
        let normalize = |v: &Value| -> Result<Value, FilterError> {
            Ok(Value::String(ItemId::from_json(v)?.to_string()))
        };
        let operand = if op.is_set() {
            let values = operand.as_array().ok_or_else(|| invalid("an array of ids"))?;
            Value::Array(values.iter().map(normalize).collect::<Result<_, _>>()?)
        } else {
            normalize(operand)?
        };
        return Ok(Condition {
            field: field.to_string(),
            op,
            operand,
        });
    }

    let operand = if op.is_set() {
        let values = operand.as_array().ok_or_else(|| invalid("an array of strings"))?;
        if !values.iter().all(|v| v.is_string() || v.is_null()) {
            return Err(invalid("an array of strings"));
        }
        operand.clone()
    } else if op.is_substring() {
        if !operand.is_string() {
            return Err(invalid("a string"));
        }
        operand.clone()
    } else {
        if !(operand.is_string() || operand.is_null()) {
            return Err(invalid("a string or null"));
        }
        operand.clone()
    };

    Ok(Condition {
        field: field.to_string(),
        op,
        operand,
    })
}

/// Sort order parsed from `orderBy: "<field>_ASC"` / `"<field>_DESC"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: String,
    pub descending: bool,
}

impl OrderBy {
    pub fn parse(list: &ListDefinition, value: &str) -> Result<Self, FilterError> {
        let invalid = || FilterError::InvalidOrder {
            value: value.to_string(),
        };
        let (field, descending) = if let Some(field) = value.strip_suffix("_ASC") {
            (field, false)
        } else if let Some(field) = value.strip_suffix("_DESC") {
            (field, true)
        } else {
            return Err(invalid());
        };
        if !list.is_scalar_field(field) {
            return Err(invalid());
        }
        Ok(Self {
            field: field.to_string(),
            descending,
        })
    }

    /// Compare two items; nulls sort first in ascending order
    pub fn compare(&self, a: &Item, b: &Item) -> Ordering {
        let ordering = match (a.value_of(&self.field), b.value_of(&self.field)) {
            (Value::String(a), Value::String(b)) => a.cmp(&b),
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Less,
            (_, Value::Null) => Ordering::Greater,
            _ => Ordering::Equal,
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}
