//! Filtered-load query construction: tokens → conditions → predicate → SQL.

pub mod interpret;
pub mod predicate;
pub mod sql;

pub use interpret::{interpret, Condition, Conditions, NormalizedFilter, Operator};
pub use predicate::{build, Predicate, PredicateVisitor};
pub use sql::{render_where, SqlRenderer};
