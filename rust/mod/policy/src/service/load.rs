use tracing::debug;

use crate::error::PolicyError;
use crate::model::{Filter, RuleRecord};
use crate::query::{build, interpret, render_where, Predicate};
use crate::service::{SqlAdapter, RULE_COLUMNS};

impl SqlAdapter {
    /// Every stored rule, in insertion order.
    pub fn load_all(&self) -> Result<Vec<RuleRecord>, PolicyError> {
        let records = self.select(&Predicate::all())?;
        debug!("SqlAdapter: loaded {} rules", records.len());
        Ok(records)
    }

    /// Rules selected by a filter, in insertion order. Read-only.
    pub fn load_filtered(&self, filter: &Filter) -> Result<Vec<RuleRecord>, PolicyError> {
        let predicate = build(&interpret(filter));
        debug!("SqlAdapter: filtered load with {:?}", predicate);
        let records = self.select(&predicate)?;
        debug!("SqlAdapter: filter selected {} rules", records.len());
        Ok(records)
    }

    /// Rules matching an arbitrary predicate.
    pub fn select(&self, predicate: &Predicate) -> Result<Vec<RuleRecord>, PolicyError> {
        let (clause, params) = render_where(predicate);
        let sql = format!(
            "SELECT {} FROM \"{}\" WHERE {} ORDER BY \"id\"",
            RULE_COLUMNS,
            self.table_name(),
            clause
        );
        let rows = self.sql.query(&sql, &params)?;
        Ok(rows.iter().map(RuleRecord::from_row).collect())
    }
}
