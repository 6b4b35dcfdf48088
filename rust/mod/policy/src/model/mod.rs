pub mod filter;
pub mod policy_model;
pub mod rule;

pub use filter::{Filter, LIKE_PREFIX, REGEX_PREFIX};
pub use policy_model::PolicyModel;
pub use rule::{Column, RuleRecord, VALUE_COLUMNS};
