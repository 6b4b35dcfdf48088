//! Persistence of access-control policy rules in a SQL table.
//!
//! Rules are `(ptype, v0..v5)` rows. The [`SqlAdapter`] loads them into a
//! [`PolicyModel`], writes them back, and supports filtered loads where each
//! policy type is restricted by per-column equality, `LIKE` or regex
//! conditions (see [`Filter`]).

pub mod adapter;
pub mod config;
pub mod error;
pub mod model;
pub mod query;
pub mod service;

pub use adapter::{Adapter, FilteredAdapter};
pub use config::AdapterConfig;
pub use error::PolicyError;
pub use model::{Column, Filter, PolicyModel, RuleRecord, VALUE_COLUMNS};
pub use query::{build, interpret, Condition, Operator, Predicate, PredicateVisitor};
pub use service::SqlAdapter;
