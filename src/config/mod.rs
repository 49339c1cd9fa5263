//! Configuration loading and management
//!
//! Lists and executor options are declared in YAML:
//!
//! ```yaml
//! executor:
//!   enforce_access_on_unfiltered_relationships: false
//! lists:
//!   - key: UserToPostLimitedRead
//!     fields:
//!       username: { type: text }
//!       posts: { type: relationship, ref: PostLimitedRead, many: true }
//!   - key: PostLimitedRead
//!     fields:
//!       content: { type: text }
//!     access:
//!       read: { id_in: ["43cg2hr9tmt3"] }
//! ```

use crate::core::error::ConfigError;
use crate::core::list::FieldType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options for the GraphQL executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Apply the target list's read rule when a relationship field is
    /// queried without a `where` argument
    ///
    /// Off by default: unfiltered traversal loads the stored references
    /// directly. A nested `where` always goes through the read rule.
    #[serde(default)]
    pub enforce_access_on_unfiltered_relationships: bool,

    /// Upper bound on `first` for list queries
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_max_results() -> usize {
    1000
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            enforce_access_on_unfiltered_relationships: false,
            max_results: default_max_results(),
        }
    }
}

/// Access rule as written in configuration: a boolean or a filter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AccessRuleConfig {
    Allowed(bool),
    Filter(serde_json::Value),
}

/// Per-operation access rules; absent rules allow the operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<AccessRuleConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<AccessRuleConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<AccessRuleConfig>,
}

/// Configuration of a single list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// PascalCase list key
    pub key: String,

    /// Plural override; derived from the key when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,

    /// Field name -> field type, in declaration order
    #[serde(default)]
    pub fields: IndexMap<String, FieldType>,

    #[serde(default)]
    pub access: AccessConfig,
}

/// Complete configuration for a server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListsConfig {
    /// Executor options; `None` when the file has no `executor` section
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor: Option<ExecutorConfig>,

    #[serde(default)]
    pub lists: Vec<ListConfig>,
}

impl ListsConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Merge several configurations
    ///
    /// Lists are concatenated in order; duplicates are reported when the
    /// server is built. Executor options come from the last configuration
    /// that has an `executor` section.
    pub fn merge(configs: Vec<ListsConfig>) -> Self {
        let mut merged = ListsConfig::default();
        for config in configs {
            if config.executor.is_some() {
                merged.executor = config.executor;
            }
            merged.lists.extend(config.lists);
        }
        merged
    }

    /// Executor options, falling back to the defaults
    pub fn executor_config(&self) -> ExecutorConfig {
        self.executor.clone().unwrap_or_default()
    }

    /// Find a list configuration by key
    pub fn find_list(&self, key: &str) -> Option<&ListConfig> {
        self.lists.iter().find(|list| list.key == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const LIMITED_READ: &str = r#"
lists:
  - key: UserToPostLimitedRead
    fields:
      username: { type: text }
      posts: { type: relationship, ref: PostLimitedRead, many: true }
  - key: PostLimitedRead
    fields:
      content: { type: text }
    access:
      read: { id_in: ["43cg2hr9tmt3"] }
      delete: false
"#;

    #[test]
    fn test_parse_limited_read_config() {
        let config = ListsConfig::from_yaml_str(LIMITED_READ).unwrap();

        assert_eq!(config.lists.len(), 2);
        assert_eq!(config.executor, None);
        let executor = config.executor_config();
        assert!(!executor.enforce_access_on_unfiltered_relationships);
        assert_eq!(executor.max_results, 1000);

        let user = config.find_list("UserToPostLimitedRead").unwrap();
        let field_names: Vec<_> = user.fields.keys().cloned().collect();
        assert_eq!(field_names, vec!["username", "posts"]);
        assert_eq!(user.fields["posts"], FieldType::to_many("PostLimitedRead"));

        let post = config.find_list("PostLimitedRead").unwrap();
        assert_eq!(
            post.access.read,
            Some(AccessRuleConfig::Filter(json!({ "id_in": ["43cg2hr9tmt3"] })))
        );
        assert_eq!(post.access.delete, Some(AccessRuleConfig::Allowed(false)));
        assert_eq!(post.access.create, None);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ListsConfig::from_yaml_str(LIMITED_READ).unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ListsConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_merge_concatenates_lists() {
        let first = ListsConfig::from_yaml_str(LIMITED_READ).unwrap();
        let second = ListsConfig::from_yaml_str(
            "executor:\n  enforce_access_on_unfiltered_relationships: true\nlists:\n  - key: Tag\n",
        )
        .unwrap();

        let merged = ListsConfig::merge(vec![first, second]);
        assert_eq!(merged.lists.len(), 3);
        assert!(merged.executor_config().enforce_access_on_unfiltered_relationships);
        assert!(merged.find_list("Tag").unwrap().fields.is_empty());
    }

    #[test]
    fn test_merge_keeps_executor_when_later_file_omits_it() {
        let first = ListsConfig::from_yaml_str(
            "executor:\n  enforce_access_on_unfiltered_relationships: true\n  max_results: 50\n",
        )
        .unwrap();
        let second = ListsConfig::from_yaml_str("lists:\n  - key: Tag\n").unwrap();

        let merged = ListsConfig::merge(vec![first, second]);
        let executor = merged.executor_config();
        assert!(executor.enforce_access_on_unfiltered_relationships);
        assert_eq!(executor.max_results, 50);
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = ListsConfig::from_yaml_str("lists: [").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }
}
