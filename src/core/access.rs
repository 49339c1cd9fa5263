//! List-level access control
//!
//! A rule either allows an operation outright, denies it, or restricts it to
//! the items matching a declarative filter. Filters supplied by a caller are
//! always ANDed with the rule, so they can narrow what a rule exposes but
//! never widen it.

use crate::config::AccessRuleConfig;
use crate::core::error::FilterError;
use crate::core::filter::WhereFilter;
use crate::core::item::Item;
use crate::core::list::ListDefinition;

/// Access rule for a single operation
#[derive(Debug, Clone, Default, PartialEq)]
pub enum AccessRule {
    #[default]
    Allow,
    Deny,
    Filter(WhereFilter),
}

impl AccessRule {
    /// Build a rule from configuration, parsing filters against `list`
    pub fn from_config(
        list: &ListDefinition,
        config: &AccessRuleConfig,
    ) -> Result<Self, FilterError> {
        match config {
            AccessRuleConfig::Allowed(true) => Ok(AccessRule::Allow),
            AccessRuleConfig::Allowed(false) => Ok(AccessRule::Deny),
            AccessRuleConfig::Filter(value) => {
                Ok(AccessRule::Filter(WhereFilter::parse(list, value)?))
            }
        }
    }

    /// Effective filter for an operation, or `None` when the rule denies it
    ///
    /// The result is `AND(rule, caller)`; with no caller filter it is the
    /// rule's own filter.
    pub fn scope(&self, caller: Option<WhereFilter>) -> Option<WhereFilter> {
        let caller = caller.unwrap_or_else(WhereFilter::all);
        match self {
            AccessRule::Allow => Some(caller),
            AccessRule::Deny => None,
            AccessRule::Filter(rule) => Some(WhereFilter::and([rule.clone(), caller])),
        }
    }

    /// Whether a concrete item is covered by this rule
    pub fn permits(&self, item: &Item) -> bool {
        match self {
            AccessRule::Allow => true,
            AccessRule::Deny => false,
            AccessRule::Filter(rule) => rule.matches(item),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessRule::Deny)
    }

    /// Whether the rule hides any item at all
    pub fn is_restricted(&self) -> bool {
        !matches!(self, AccessRule::Allow)
    }
}

/// Access rules of a list, one per operation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListAccess {
    pub read: AccessRule,
    pub create: AccessRule,
    pub delete: AccessRule,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::list::FieldType;
    use serde_json::json;

    fn post_list() -> ListDefinition {
        ListDefinition::new("PostLimitedRead").with_field("content", FieldType::text())
    }

    fn post(id: &str) -> Item {
        Item::from_payload(&post_list(), json!({ "id": id, "content": "x" })).unwrap()
    }

    fn limited_read() -> AccessRule {
        AccessRule::from_config(
            &post_list(),
            &AccessRuleConfig::Filter(json!({ "id_in": ["43cg2hr9tmt3"] })),
        )
        .unwrap()
    }

    #[test]
    fn test_scope_without_caller_is_rule() {
        let scope = limited_read().scope(None).unwrap();
        assert!(scope.matches(&post("43cg2hr9tmt3")));
        assert!(!scope.matches(&post("3qr8zpg7n4k6")));
    }

    #[test]
    fn test_caller_filter_cannot_widen() {
        let caller = WhereFilter::parse(
            &post_list(),
            &json!({ "id_in": ["gjfp463bxqtf", "43cg2hr9tmt3", "3qr8zpg7n4k6"] }),
        )
        .unwrap();
        let scope = limited_read().scope(Some(caller)).unwrap();

        assert!(!scope.matches(&post("gjfp463bxqtf")));
        assert!(scope.matches(&post("43cg2hr9tmt3")));
        assert!(!scope.matches(&post("3qr8zpg7n4k6")));
    }

    #[test]
    fn test_caller_filter_outside_rule_matches_nothing() {
        let caller =
            WhereFilter::parse(&post_list(), &json!({ "id_in": ["3qr8zpg7n4k6"] })).unwrap();
        let scope = limited_read().scope(Some(caller)).unwrap();
        assert!(!scope.matches(&post("43cg2hr9tmt3")));
        assert!(!scope.matches(&post("3qr8zpg7n4k6")));
    }

    #[test]
    fn test_boolean_rules() {
        let list = post_list();
        let allow = AccessRule::from_config(&list, &AccessRuleConfig::Allowed(true)).unwrap();
        let deny = AccessRule::from_config(&list, &AccessRuleConfig::Allowed(false)).unwrap();

        assert_eq!(allow, AccessRule::Allow);
        assert!(allow.scope(None).unwrap().is_unrestricted());
        assert!(deny.scope(None).is_none());
        assert!(deny.is_denied());
        assert!(!deny.permits(&post("43cg2hr9tmt3")));
    }

    #[test]
    fn test_permits_follows_filter() {
        let rule = limited_read();
        assert!(rule.is_restricted());
        assert!(rule.permits(&post("43cg2hr9tmt3")));
        assert!(!rule.permits(&post("gjfp463bxqtf")));
    }
}
