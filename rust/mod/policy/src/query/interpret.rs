use std::collections::BTreeMap;

use crate::model::{Column, Filter, LIKE_PREFIX, REGEX_PREFIX};

/// Comparison applied to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Equals,
    /// `LIKE` pattern (`%`, `_`), ASCII case-insensitive.
    Like,
    /// Regular expression, unanchored search.
    Regex,
}

/// A normalized column condition: operator plus operand.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Condition {
    pub operator: Operator,
    pub operand: String,
}

impl Condition {
    pub fn new(operator: Operator, operand: impl Into<String>) -> Self {
        Self {
            operator,
            operand: operand.into(),
        }
    }
}

/// Conditions of one policy type, keyed by value column.
pub type Conditions = BTreeMap<Column, Condition>;

/// Interpreted filter: policy type to its column conditions.
pub type NormalizedFilter = BTreeMap<String, Conditions>;

/// Interpret a single token. Empty tokens place no constraint.
///
/// Never fails: anything without a recognized prefix is an equality operand,
/// including tokens that merely look malformed.
pub fn interpret_token(token: &str) -> Option<Condition> {
    if token.is_empty() {
        return None;
    }
    if let Some(pattern) = token.strip_prefix(REGEX_PREFIX) {
        return Some(Condition::new(Operator::Regex, pattern));
    }
    if let Some(pattern) = token.strip_prefix(LIKE_PREFIX) {
        return Some(Condition::new(Operator::Like, pattern));
    }
    Some(Condition::new(Operator::Equals, token))
}

/// Interpret positional tokens: token `i` constrains `v{i}`. Tokens past `v5`
/// have no column and are ignored.
pub fn interpret_conditions(tokens: &[Option<String>]) -> Conditions {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(i, token)| {
            let column = Column::value(i)?;
            let condition = interpret_token(token.as_deref()?)?;
            Some((column, condition))
        })
        .collect()
}

/// Interpret every policy type of a filter.
pub fn interpret(filter: &Filter) -> NormalizedFilter {
    filter
        .iter()
        .map(|(ptype, tokens)| (ptype.to_string(), interpret_conditions(tokens)))
        .collect()
}
