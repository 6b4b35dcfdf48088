use thiserror::Error;

/// Stable, machine-readable error codes. Messages may be reworded; codes never change.
pub mod error_code {
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
}

#[derive(Error, Debug)]
pub enum PolicyError {
    /// Caller-supplied input is unusable (empty ptype, bad table name, ...).
    #[error("validation: {0}")]
    Validation(String),

    /// The SQL backend rejected or failed a statement.
    #[error("storage: {0}")]
    Storage(String),
}

impl PolicyError {
    pub fn error_code(&self) -> &'static str {
        match self {
            PolicyError::Validation(_) => error_code::VALIDATION_FAILED,
            PolicyError::Storage(_) => error_code::STORAGE_ERROR,
        }
    }
}

impl From<rulestore_sql::SQLError> for PolicyError {
    fn from(e: rulestore_sql::SQLError) -> Self {
        PolicyError::Storage(e.to_string())
    }
}
