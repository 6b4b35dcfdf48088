//! SQL-backed policy adapter.

mod load;
mod schema;
mod write;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rulestore_sql::SQLStore;
use tracing::debug;

use crate::adapter::{Adapter, FilteredAdapter};
use crate::config::AdapterConfig;
use crate::error::PolicyError;
use crate::model::{Filter, PolicyModel};

/// Columns read and written for every rule, in table order.
pub(crate) const RULE_COLUMNS: &str = "\"ptype\", \"v0\", \"v1\", \"v2\", \"v3\", \"v4\", \"v5\"";

/// Persists policy rules in one table of a [`SQLStore`].
///
/// Calls are independent statements against the store: there is no locking
/// or transaction beyond what the store itself provides.
pub struct SqlAdapter {
    sql: Arc<dyn SQLStore>,
    config: AdapterConfig,
    filtered: AtomicBool,
}

impl SqlAdapter {
    /// Create an adapter. Validates the table name and, if
    /// `config.create_table` is set, creates the table when missing.
    pub fn new(sql: Arc<dyn SQLStore>, config: AdapterConfig) -> Result<Self, PolicyError> {
        config.validate()?;
        debug!("SqlAdapter: created with {:?}", config);

        let adapter = Self {
            sql,
            config,
            filtered: AtomicBool::new(false),
        };
        if adapter.config.create_table {
            adapter.create_table()?;
        }
        Ok(adapter)
    }

    pub fn table_name(&self) -> &str {
        &self.config.table_name
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

fn validate_ptype(ptype: &str) -> Result<(), PolicyError> {
    if ptype.is_empty() {
        return Err(PolicyError::Validation("policy type cannot be empty".into()));
    }
    Ok(())
}

impl Adapter for SqlAdapter {
    fn load_policy(&self, model: &mut PolicyModel) -> Result<(), PolicyError> {
        let records = self.load_all()?;
        for record in &records {
            model.load_policy_line(&record.to_policy_line());
        }
        self.filtered.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn save_policy(&self, model: &PolicyModel) -> Result<bool, PolicyError> {
        let rules: Vec<(String, Vec<String>)> = model
            .rules()
            .map(|(ptype, rule)| (ptype.to_string(), rule.to_vec()))
            .collect();
        self.save_all(&rules)
    }

    fn add_policy(&self, _sec: &str, ptype: &str, rule: &[String]) -> Result<(), PolicyError> {
        self.add(ptype, rule)
    }

    fn remove_policy(&self, _sec: &str, ptype: &str, rule: &[String]) -> Result<(), PolicyError> {
        self.remove(ptype, rule).map(|_| ())
    }

    fn add_policies(
        &self,
        _sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> Result<(), PolicyError> {
        self.add_many(ptype, rules)
    }

    fn remove_policies(
        &self,
        _sec: &str,
        ptype: &str,
        rules: &[Vec<String>],
    ) -> Result<(), PolicyError> {
        self.remove_many(ptype, rules).map(|_| ())
    }

    fn remove_filtered_policy(
        &self,
        _sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: &[String],
    ) -> Result<(), PolicyError> {
        self.remove_filtered(ptype, field_index, field_values).map(|_| ())
    }
}

impl FilteredAdapter for SqlAdapter {
    fn load_filtered_policy(
        &self,
        model: &mut PolicyModel,
        filter: &Filter,
    ) -> Result<(), PolicyError> {
        let records = self.load_filtered(filter)?;
        for record in &records {
            model.load_policy_line(&record.to_policy_line());
        }
        self.filtered.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.filtered.load(Ordering::SeqCst)
    }
}
