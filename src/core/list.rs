//! List definitions
//!
//! A list is a named collection of items sharing a set of fields, similar to
//! a table. Its definition also carries the access rules applied to every
//! operation on it.

use crate::config::ListConfig;
use crate::core::access::{AccessRule, ListAccess};
use crate::core::error::{AccessOperation, ConfigError};
use crate::core::filter::WhereFilter;
use crate::core::pluralize::Pluralizer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Field names every list provides implicitly
pub const RESERVED_FIELDS: &[&str] = &["id", "__typename"];

/// Type of a field declared on a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldType {
    /// Plain text (nullable string)
    Text,

    /// Reference to one or more items of another list
    Relationship {
        #[serde(rename = "ref")]
        target: String,
        #[serde(default)]
        many: bool,
    },
}

impl FieldType {
    pub fn text() -> Self {
        FieldType::Text
    }

    pub fn to_many(target: impl Into<String>) -> Self {
        FieldType::Relationship {
            target: target.into(),
            many: true,
        }
    }

    pub fn to_one(target: impl Into<String>) -> Self {
        FieldType::Relationship {
            target: target.into(),
            many: false,
        }
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, FieldType::Relationship { .. })
    }
}

/// Schema of a single list
#[derive(Debug, Clone)]
pub struct ListDefinition {
    /// PascalCase key (e.g., "UserToPostLimitedRead")
    pub key: String,

    /// Plural form of the key (e.g., "UserToPostLimitedReads")
    pub plural: String,

    /// Declared fields, in declaration order
    pub fields: IndexMap<String, FieldType>,

    /// Access rules for this list
    pub access: ListAccess,
}

impl ListDefinition {
    /// Create a list with unrestricted access
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        let plural = Pluralizer::pluralize(&key);
        Self {
            key,
            plural,
            fields: IndexMap::new(),
            access: ListAccess::default(),
        }
    }

    /// Add a field
    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    /// Override the generated plural
    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = plural.into();
        self
    }

    /// Set the read rule
    pub fn with_read_access(mut self, rule: AccessRule) -> Self {
        self.access.read = rule;
        self
    }

    /// Set the create rule
    pub fn with_create_access(mut self, rule: AccessRule) -> Self {
        self.access.create = rule;
        self
    }

    /// Set the delete rule
    pub fn with_delete_access(mut self, rule: AccessRule) -> Self {
        self.access.delete = rule;
        self
    }

    /// Build a definition from its configuration, parsing access filters
    /// against the list's own fields
    pub fn from_config(config: &ListConfig) -> Result<Self, ConfigError> {
        if !is_pascal_identifier(&config.key) {
            return Err(ConfigError::InvalidListKey {
                key: config.key.clone(),
            });
        }

        let mut list = ListDefinition::new(&config.key);
        if let Some(plural) = &config.plural {
            list.plural = plural.clone();
        }

        for (name, field_type) in &config.fields {
            if RESERVED_FIELDS.contains(&name.as_str()) || name.starts_with('_') {
                return Err(ConfigError::ReservedField {
                    list: config.key.clone(),
                    field: name.clone(),
                });
            }
            list.fields.insert(name.clone(), field_type.clone());
        }

        let rules = [
            (AccessOperation::Read, &config.access.read),
            (AccessOperation::Create, &config.access.create),
            (AccessOperation::Delete, &config.access.delete),
        ];
        for (operation, rule_config) in rules {
            let Some(rule_config) = rule_config else {
                continue;
            };
            let rule = AccessRule::from_config(&list, rule_config).map_err(|source| {
                ConfigError::InvalidAccessRule {
                    list: config.key.clone(),
                    operation,
                    source,
                }
            })?;
            match operation {
                AccessOperation::Read => list.access.read = rule,
                AccessOperation::Create => list.access.create = rule,
                AccessOperation::Delete => list.access.delete = rule,
            }
        }

        Ok(list)
    }

    /// Look up a declared field
    pub fn field(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    /// Whether `name` can be filtered on (`id` or a text field)
    pub fn is_scalar_field(&self, name: &str) -> bool {
        name == "id" || matches!(self.fields.get(name), Some(FieldType::Text))
    }

    /// Relationship fields, in declaration order
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.fields.iter().filter_map(|(name, field)| match field {
            FieldType::Relationship { target, many } => {
                Some((name.as_str(), target.as_str(), *many))
            }
            FieldType::Text => None,
        })
    }

    /// Root query returning many items (e.g., "allPosts")
    pub fn list_query_name(&self) -> String {
        format!("all{}", self.plural)
    }

    /// Root query returning the count of matching items (e.g., "_allPostsMeta")
    pub fn meta_query_name(&self) -> String {
        format!("_all{}Meta", self.plural)
    }

    pub fn create_mutation_name(&self) -> String {
        format!("create{}", self.key)
    }

    pub fn delete_mutation_name(&self) -> String {
        format!("delete{}", self.key)
    }

    /// Build a `where` filter for this list from its JSON form
    pub fn parse_filter(
        &self,
        value: &serde_json::Value,
    ) -> Result<WhereFilter, crate::core::error::FilterError> {
        WhereFilter::parse(self, value)
    }
}

/// Name of the meta field exposed for a relationship (e.g., "_postsMeta")
pub fn relationship_meta_name(field: &str) -> String {
    format!("_{}Meta", field)
}

fn is_pascal_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_uppercase())
        && chars.all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AccessConfig, AccessRuleConfig};
    use serde_json::json;

    fn post_config() -> ListConfig {
        ListConfig {
            key: "PostLimitedRead".to_string(),
            plural: None,
            fields: IndexMap::from([("content".to_string(), FieldType::Text)]),
            access: AccessConfig {
                read: Some(AccessRuleConfig::Filter(json!({ "id_in": ["43cg2hr9tmt3"] }))),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_query_names_follow_plural() {
        let list = ListDefinition::new("UserToPostLimitedRead");
        assert_eq!(list.plural, "UserToPostLimitedReads");
        assert_eq!(list.list_query_name(), "allUserToPostLimitedReads");
        assert_eq!(list.meta_query_name(), "_allUserToPostLimitedReadsMeta");
        assert_eq!(list.create_mutation_name(), "createUserToPostLimitedRead");
        assert_eq!(relationship_meta_name("posts"), "_postsMeta");
    }

    #[test]
    fn test_from_config_parses_read_filter() {
        let list = ListDefinition::from_config(&post_config()).unwrap();
        assert!(list.access.read.is_restricted());
        assert!(!list.access.create.is_restricted());
        assert!(list.is_scalar_field("content"));
        assert!(list.is_scalar_field("id"));
    }

    #[test]
    fn test_from_config_rejects_reserved_field() {
        let mut config = post_config();
        config.fields.insert("id".to_string(), FieldType::Text);
        let err = ListDefinition::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ReservedField { .. }));
    }

    #[test]
    fn test_from_config_rejects_filter_on_unknown_field() {
        let mut config = post_config();
        config.access.read = Some(AccessRuleConfig::Filter(json!({ "title": "x" })));
        let err = ListDefinition::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidAccessRule {
                operation: AccessOperation::Read,
                ..
            }
        ));
    }

    #[test]
    fn test_from_config_rejects_lowercase_key() {
        let mut config = post_config();
        config.key = "post".to_string();
        assert!(matches!(
            ListDefinition::from_config(&config),
            Err(ConfigError::InvalidListKey { .. })
        ));
    }

    #[test]
    fn test_relationships_iterates_in_order() {
        let list = ListDefinition::new("User")
            .with_field("username", FieldType::text())
            .with_field("posts", FieldType::to_many("Post"))
            .with_field("best", FieldType::to_one("Post"));
        let rels: Vec<_> = list.relationships().collect();
        assert_eq!(rels, vec![("posts", "Post", true), ("best", "Post", false)]);
    }

    #[test]
    fn test_field_type_yaml_shape() {
        let field: FieldType =
            serde_yaml::from_str("type: relationship\nref: PostLimitedRead\nmany: true").unwrap();
        assert_eq!(field, FieldType::to_many("PostLimitedRead"));
        let text: FieldType = serde_yaml::from_str("type: text").unwrap();
        assert_eq!(text, FieldType::Text);
    }
}
