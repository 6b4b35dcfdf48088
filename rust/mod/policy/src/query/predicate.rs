use regex::Regex;

use crate::error::PolicyError;
use crate::model::{Column, RuleRecord};
use crate::query::interpret::{Condition, Conditions, NormalizedFilter, Operator};

/// Backend-agnostic boolean condition over rule columns.
///
/// `And(vec![])` is always true and `Or(vec![])` always false.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Equals(Column, String),
    Like(Column, String),
    Regex(Column, String),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Renders or evaluates a [`Predicate`]. Combinator methods receive the
/// children and decide how (and whether) to visit them.
pub trait PredicateVisitor {
    type Output;

    fn equals(&mut self, column: Column, operand: &str) -> Self::Output;
    fn like(&mut self, column: Column, pattern: &str) -> Self::Output;
    fn regex(&mut self, column: Column, pattern: &str) -> Self::Output;
    fn and(&mut self, parts: &[Predicate]) -> Self::Output;
    fn or(&mut self, parts: &[Predicate]) -> Self::Output;
}

impl Predicate {
    /// Matches every row.
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    /// Leaf predicate for one normalized condition.
    pub fn condition(column: Column, condition: &Condition) -> Self {
        let operand = condition.operand.clone();
        match condition.operator {
            Operator::Equals => Predicate::Equals(column, operand),
            Operator::Like => Predicate::Like(column, operand),
            Operator::Regex => Predicate::Regex(column, operand),
        }
    }

    /// `ptype = <ptype>` AND `column = value` for every pair.
    pub fn exact<I>(ptype: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = (Column, String)>,
    {
        let mut parts = vec![Predicate::Equals(Column::Ptype, ptype.to_string())];
        parts.extend(columns.into_iter().map(|(c, v)| Predicate::Equals(c, v)));
        Predicate::And(parts)
    }

    pub fn accept<V: PredicateVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Predicate::Equals(c, v) => visitor.equals(*c, v),
            Predicate::Like(c, p) => visitor.like(*c, p),
            Predicate::Regex(c, p) => visitor.regex(*c, p),
            Predicate::And(parts) => visitor.and(parts),
            Predicate::Or(parts) => visitor.or(parts),
        }
    }

    /// Evaluate against a record. Fails only on an invalid regex.
    pub fn matches(&self, record: &RuleRecord) -> Result<bool, PolicyError> {
        self.accept(&mut RecordMatcher { record })
    }

    /// Keep the records this predicate selects, preserving order.
    pub fn select<I>(&self, records: I) -> Result<Vec<RuleRecord>, PolicyError>
    where
        I: IntoIterator<Item = RuleRecord>,
    {
        let mut selected = Vec::new();
        for record in records {
            if self.matches(&record)? {
                selected.push(record);
            }
        }
        Ok(selected)
    }
}

/// Conjunction for one policy type: its discriminator plus every condition.
fn branch(ptype: &str, conditions: &Conditions) -> Predicate {
    let mut parts = Vec::with_capacity(1 + conditions.len());
    parts.push(Predicate::Equals(Column::Ptype, ptype.to_string()));
    parts.extend(
        conditions
            .iter()
            .map(|(column, condition)| Predicate::condition(*column, condition)),
    );
    Predicate::And(parts)
}

/// Compose a filtered-load predicate: conditions within a policy type are
/// AND-ed, policy types are OR-ed.
///
/// A single policy type yields its conjunction directly. A policy type with
/// no conditions selects all of its rules. An empty filter selects everything.
pub fn build(normalized: &NormalizedFilter) -> Predicate {
    let mut branches: Vec<Predicate> = normalized
        .iter()
        .map(|(ptype, conditions)| branch(ptype, conditions))
        .collect();
    match branches.len() {
        0 => Predicate::all(),
        1 => branches.swap_remove(0),
        _ => Predicate::Or(branches),
    }
}

struct RecordMatcher<'a> {
    record: &'a RuleRecord,
}

impl PredicateVisitor for RecordMatcher<'_> {
    type Output = Result<bool, PolicyError>;

    fn equals(&mut self, column: Column, operand: &str) -> Self::Output {
        Ok(self.record.get(column) == operand)
    }

    fn like(&mut self, column: Column, pattern: &str) -> Self::Output {
        Ok(like_match(pattern, self.record.get(column)))
    }

    fn regex(&mut self, column: Column, pattern: &str) -> Self::Output {
        let re = Regex::new(pattern)
            .map_err(|e| PolicyError::Validation(format!("regex {:?}: {}", pattern, e)))?;
        Ok(re.is_match(self.record.get(column)))
    }

    fn and(&mut self, parts: &[Predicate]) -> Self::Output {
        for part in parts {
            if !part.accept(self)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn or(&mut self, parts: &[Predicate]) -> Self::Output {
        for part in parts {
            if part.accept(self)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

/// SQL `LIKE` without an escape character: `%` matches any run, `_` any one
/// character, letters compare ASCII case-insensitively (as SQLite does).
pub fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0, 0);
    // Position of the last `%` and the text index it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            backtrack = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi].eq_ignore_ascii_case(&t[ti])) {
            pi += 1;
            ti += 1;
        } else if let Some((star, absorbed)) = backtrack {
            pi = star + 1;
            ti = absorbed + 1;
            backtrack = Some((star, absorbed + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|&c| c == '%')
}
