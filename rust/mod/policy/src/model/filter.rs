use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PolicyError;

/// Token prefix selecting a regular-expression match.
pub const REGEX_PREFIX: &str = "regex:";

/// Token prefix selecting a case-insensitive `LIKE` match.
pub const LIKE_PREFIX: &str = "like:";

/// A filtered-load request: policy type to positional tokens.
///
/// Token `i` constrains column `v{i}`:
///
/// | token              | meaning                                   |
/// |--------------------|-------------------------------------------|
/// | `""` / `null`      | unconstrained                             |
/// | `"regex:<pat>"`    | column matches the regular expression     |
/// | `"like:<pat>"`     | column `LIKE` pattern, case-insensitive   |
/// | anything else      | column equals the token                   |
///
/// Serializes as a plain JSON object, e.g. `{"p": ["", "data1"], "g": []}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(pub BTreeMap<String, Vec<Option<String>>>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the tokens for a policy type. Empty strings stay
    /// unconstrained.
    pub fn ptype<I, S>(mut self, ptype: &str, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens.into_iter().map(|t| Some(t.into())).collect();
        self.0.insert(ptype.to_string(), tokens);
        self
    }

    /// Parse a filter from its JSON form.
    pub fn from_json(s: &str) -> Result<Self, PolicyError> {
        serde_json::from_str(s).map_err(|e| PolicyError::Validation(format!("filter: {}", e)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Policy types with their tokens, ordered by policy type.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Option<String>])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_accepts_nulls_and_empty_lists() {
        let f = Filter::from_json(r#"{"p": ["", "data1", null], "g": []}"#).unwrap();
        let entries: Vec<_> = f.iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, "g");
        assert!(entries[0].1.is_empty());
        assert_eq!(
            entries[1].1,
            &[Some(String::new()), Some("data1".to_string()), None]
        );
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        let err = Filter::from_json(r#"["p"]"#).unwrap_err();
        assert!(matches!(err, PolicyError::Validation(_)));
    }

    #[test]
    fn test_builder_matches_json() {
        let built = Filter::new().ptype("p", ["", "like:data-%"]).ptype("g", Vec::<String>::new());
        let parsed = Filter::from_json(r#"{"g": [], "p": ["", "like:data-%"]}"#).unwrap();
        assert_eq!(built, parsed);
    }
}
