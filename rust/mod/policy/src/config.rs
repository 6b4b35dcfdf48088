use crate::error::PolicyError;

/// Default table holding policy rules.
pub const DEFAULT_TABLE: &str = "casbin_rule";

/// Adapter configuration.
///
/// Binaries parse these from command-line arguments and hand them to
/// [`SqlAdapter::new`](crate::SqlAdapter::new).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Table holding the rules. Interpolated into SQL, so it must be a plain
    /// identifier (see [`AdapterConfig::validate`]).
    pub table_name: String,

    /// Create the table (if missing) when the adapter is constructed.
    pub create_table: bool,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            table_name: DEFAULT_TABLE.to_string(),
            create_table: true,
        }
    }
}

impl AdapterConfig {
    /// Parse configuration from command-line arguments.
    ///
    /// Entry point for hosts embedding the adapter that forward their own
    /// argument list. `rulectl` declares the same flags through clap instead.
    ///
    /// Supported flags:
    /// - `--table=NAME`
    /// - `--no-create-table`
    ///
    /// Unknown arguments are ignored.
    pub fn from_args(args: &[String]) -> Self {
        let mut config = AdapterConfig::default();

        for arg in args {
            if let Some(val) = arg.strip_prefix("--table=") {
                config.table_name = val.to_string();
            } else if arg == "--no-create-table" {
                config.create_table = false;
            }
        }

        config
    }

    /// Check that the table name is `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn validate(&self) -> Result<(), PolicyError> {
        let mut chars = self.table_name.chars();
        let valid = match chars.next() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            }
            _ => false,
        };
        if !valid {
            return Err(PolicyError::Validation(format!(
                "invalid table name '{}'",
                self.table_name
            )));
        }
        Ok(())
    }
}
