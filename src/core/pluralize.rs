//! Pluralization of list keys
//!
//! List keys are PascalCase compounds ("UserToPostLimitedRead"); only the
//! final word is inflected, and its leading capital is preserved.

/// Irregular plurals matched on the lowercase final word
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("child", "children"),
    ("man", "men"),
    ("woman", "women"),
    ("mouse", "mice"),
];

/// Words whose plural is the word itself
const UNCOUNTABLE: &[&str] = &["data", "media", "series", "species", "information", "news"];

/// Utility for deriving plural list names
pub struct Pluralizer;

impl Pluralizer {
    /// Pluralize a list key
    ///
    /// # Examples
    ///
    /// ```
    /// use listgate::core::pluralize::Pluralizer;
    ///
    /// assert_eq!(Pluralizer::pluralize("PostLimitedRead"), "PostLimitedReads");
    /// assert_eq!(Pluralizer::pluralize("BlogCategory"), "BlogCategories");
    /// assert_eq!(Pluralizer::pluralize("TeamPerson"), "TeamPeople");
    /// ```
    pub fn pluralize(key: &str) -> String {
        if key.is_empty() {
            return String::new();
        }

        let split = last_word_start(key);
        let (head, word) = key.split_at(split);
        let lower = word.to_ascii_lowercase();

        if UNCOUNTABLE.contains(&lower.as_str()) {
            return key.to_string();
        }

        if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == lower) {
            return format!("{}{}", head, match_case(word, plural));
        }

        format!("{}{}", head, inflect(word))
    }
}

/// Byte offset of the last PascalCase word
fn last_word_start(key: &str) -> usize {
    key.char_indices()
        .rev()
        .find(|(i, c)| *i > 0 && c.is_ascii_uppercase())
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Re-apply the leading capital of `original` to `replacement`
fn match_case(original: &str, replacement: &str) -> String {
    let mut chars = replacement.chars();
    match (original.chars().next(), chars.next()) {
        (Some(first), Some(rep_first)) if first.is_ascii_uppercase() => {
            format!("{}{}", rep_first.to_ascii_uppercase(), chars.as_str())
        }
        _ => replacement.to_string(),
    }
}

fn inflect(word: &str) -> String {
    let lower = word.to_ascii_lowercase();
    match lower.as_str() {
        // Consonant + y -> ies
        s if s.ends_with('y')
            && s.len() > 1
            && !matches!(s.as_bytes()[s.len() - 2], b'a' | b'e' | b'i' | b'o' | b'u') =>
        {
            format!("{}ies", &word[..word.len() - 1])
        }

        // Sibilants -> es
        s if s.ends_with('s')
            || s.ends_with("sh")
            || s.ends_with("ch")
            || s.ends_with('x')
            || s.ends_with('z') =>
        {
            format!("{}es", word)
        }

        // fe -> ves
        s if s.ends_with("fe") && s.len() > 2 => format!("{}ves", &word[..word.len() - 2]),

        // f -> ves, except "ff" endings
        s if s.ends_with('f') && !s.ends_with("ff") && s.len() > 1 => {
            format!("{}ves", &word[..word.len() - 1])
        }

        _ => format!("{}s", word),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize_pascal_keys() {
        assert_eq!(Pluralizer::pluralize("UserToPostLimitedRead"), "UserToPostLimitedReads");
        assert_eq!(Pluralizer::pluralize("PostLimitedRead"), "PostLimitedReads");
        assert_eq!(Pluralizer::pluralize("User"), "Users");
    }

    #[test]
    fn test_pluralize_y_ending() {
        assert_eq!(Pluralizer::pluralize("Company"), "Companies");
        assert_eq!(Pluralizer::pluralize("BlogCategory"), "BlogCategories");
        assert_eq!(Pluralizer::pluralize("Day"), "Days");
        assert_eq!(Pluralizer::pluralize("ApiKey"), "ApiKeys");
    }

    #[test]
    fn test_pluralize_sibilants_and_f() {
        assert_eq!(Pluralizer::pluralize("Address"), "Addresses");
        assert_eq!(Pluralizer::pluralize("Box"), "Boxes");
        assert_eq!(Pluralizer::pluralize("Church"), "Churches");
        assert_eq!(Pluralizer::pluralize("Knife"), "Knives");
        assert_eq!(Pluralizer::pluralize("Shelf"), "Shelves");
        assert_eq!(Pluralizer::pluralize("Staff"), "Staffs");
    }

    #[test]
    fn test_pluralize_irregular_and_uncountable() {
        assert_eq!(Pluralizer::pluralize("Person"), "People");
        assert_eq!(Pluralizer::pluralize("TeamPerson"), "TeamPeople");
        assert_eq!(Pluralizer::pluralize("SensorData"), "SensorData");
    }

    #[test]
    fn test_pluralize_empty_string() {
        assert_eq!(Pluralizer::pluralize(""), "");
    }
}
