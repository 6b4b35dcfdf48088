use rulestore_sql::Value;

use crate::model::Column;
use crate::query::predicate::{Predicate, PredicateVisitor};

/// Renders a [`Predicate`] as a SQLite WHERE clause with numbered `?N`
/// placeholders. Operands are always bound, never inlined.
#[derive(Debug, Default)]
pub struct SqlRenderer {
    params: Vec<Value>,
}

impl SqlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render a predicate, returning the clause (without `WHERE`) and its
    /// parameters.
    pub fn render(mut self, predicate: &Predicate) -> (String, Vec<Value>) {
        let clause = predicate.accept(&mut self);
        (clause, self.params)
    }

    fn bind(&mut self, value: &str) -> String {
        self.params.push(Value::Text(value.to_string()));
        format!("?{}", self.params.len())
    }

    fn compare(&mut self, column: Column, op: &str, operand: &str) -> String {
        let placeholder = self.bind(operand);
        format!("\"{}\" {} {}", column.name(), op, placeholder)
    }

    fn join(&mut self, parts: &[Predicate], op: &str, empty: &str) -> String {
        if parts.is_empty() {
            return empty.to_string();
        }
        let rendered: Vec<String> = parts.iter().map(|p| p.accept(self)).collect();
        format!("({})", rendered.join(op))
    }
}

impl PredicateVisitor for SqlRenderer {
    type Output = String;

    fn equals(&mut self, column: Column, operand: &str) -> String {
        self.compare(column, "=", operand)
    }

    fn like(&mut self, column: Column, pattern: &str) -> String {
        self.compare(column, "LIKE", pattern)
    }

    fn regex(&mut self, column: Column, pattern: &str) -> String {
        self.compare(column, "REGEXP", pattern)
    }

    fn and(&mut self, parts: &[Predicate]) -> String {
        self.join(parts, " AND ", "1 = 1")
    }

    fn or(&mut self, parts: &[Predicate]) -> String {
        self.join(parts, " OR ", "1 = 0")
    }
}

/// Shorthand for `SqlRenderer::new().render(predicate)`.
pub fn render_where(predicate: &Predicate) -> (String, Vec<Value>) {
    SqlRenderer::new().render(predicate)
}
