use rulestore_sql::Value;
use tracing::{debug, info, warn};

use crate::error::PolicyError;
use crate::model::{Column, RuleRecord, VALUE_COLUMNS};
use crate::query::{render_where, Predicate};
use crate::service::{validate_ptype, SqlAdapter, RULE_COLUMNS};

/// Rows per multi-row INSERT. 7 parameters each keeps a statement under
/// SQLite's default limit of 999 bound parameters.
const INSERT_CHUNK: usize = 100;

impl SqlAdapter {
    /// Replace every stored rule with `rules`.
    ///
    /// Not atomic: the table is dropped and recreated first, then the rules
    /// are inserted. A failure while inserting is logged and reported as
    /// `Ok(false)`, with the table left empty or partially filled. Readers
    /// running concurrently may observe that intermediate state. Failures to
    /// drop or recreate the table are returned as errors.
    pub fn save_all(&self, rules: &[(String, Vec<String>)]) -> Result<bool, PolicyError> {
        info!("SqlAdapter: saving {} rules", rules.len());

        self.drop_table()?;
        self.create_table()?;

        let inserted = rules
            .iter()
            .map(|(ptype, rule)| -> Result<RuleRecord, PolicyError> {
                validate_ptype(ptype)?;
                Ok(record_for(ptype, rule.as_slice()))
            })
            .collect::<Result<Vec<_>, PolicyError>>()
            .and_then(|records| self.insert_records(&records));

        match inserted {
            Ok(count) => {
                debug!("SqlAdapter: saved {} rules", count);
                Ok(true)
            }
            Err(e) => {
                warn!("SqlAdapter: save failed, store left cleared: {}", e);
                Ok(false)
            }
        }
    }

    /// Insert one rule. Missing trailing values are stored as `""`.
    pub fn add<S: AsRef<str>>(&self, ptype: &str, rule: &[S]) -> Result<(), PolicyError> {
        validate_ptype(ptype)?;
        let record = record_for(ptype, rule);
        debug!("SqlAdapter: adding {:?}", record);
        self.insert_records(std::slice::from_ref(&record))?;
        Ok(())
    }

    /// Insert several rules, one statement per chunk. Not transactional.
    pub fn add_many(&self, ptype: &str, rules: &[Vec<String>]) -> Result<(), PolicyError> {
        validate_ptype(ptype)?;
        let records: Vec<RuleRecord> = rules
            .iter()
            .map(|rule| record_for(ptype, rule.as_slice()))
            .collect();
        self.insert_records(&records)?;
        Ok(())
    }

    /// Delete rules of `ptype` whose leading values equal `rule`.
    ///
    /// Only the supplied positions are compared: a three-value rule leaves
    /// `v3`..`v5` unconstrained. Returns the number of rows deleted.
    pub fn remove<S: AsRef<str>>(&self, ptype: &str, rule: &[S]) -> Result<u64, PolicyError> {
        validate_ptype(ptype)?;
        let columns = Column::VALUES.iter().zip(rule).map(|(column, value)| {
            let value: &str = value.as_ref();
            (*column, value.to_string())
        });
        let predicate = Predicate::exact(ptype, columns);
        debug!("SqlAdapter: removing {:?}", predicate);
        self.delete_where(&predicate)
    }

    /// Delete several rules, one statement each. Not transactional.
    pub fn remove_many(&self, ptype: &str, rules: &[Vec<String>]) -> Result<u64, PolicyError> {
        let mut removed = 0;
        for rule in rules {
            removed += self.remove(ptype, rule.as_slice())?;
        }
        Ok(removed)
    }

    /// Delete rules of `ptype` where `v{field_index + i} = field_values[i]`.
    ///
    /// Columns outside the supplied range are unconstrained, so an empty
    /// `field_values` removes every rule of the type. Values that would fall
    /// past `v5` are ignored. An empty value still compares for equality with
    /// `""`. Returns the number of rows deleted.
    ///
    /// A `field_index` of 6 or more is rejected with
    /// [`PolicyError::Validation`] and nothing is deleted. It names no value
    /// column, so it is not treated as "match every rule of `ptype`".
    pub fn remove_filtered<S: AsRef<str>>(
        &self,
        ptype: &str,
        field_index: usize,
        field_values: &[S],
    ) -> Result<u64, PolicyError> {
        validate_ptype(ptype)?;
        if field_index >= VALUE_COLUMNS {
            return Err(PolicyError::Validation(format!(
                "field index {} is out of range (0..{})",
                field_index, VALUE_COLUMNS
            )));
        }
        let columns = field_values.iter().enumerate().filter_map(|(i, value)| {
            let value: &str = value.as_ref();
            Column::value(field_index + i).map(|column| (column, value.to_string()))
        });
        let predicate = Predicate::exact(ptype, columns);
        debug!("SqlAdapter: removing filtered {:?}", predicate);
        self.delete_where(&predicate)
    }

    fn delete_where(&self, predicate: &Predicate) -> Result<u64, PolicyError> {
        let (clause, params) = render_where(predicate);
        let sql = format!("DELETE FROM \"{}\" WHERE {}", self.table_name(), clause);
        Ok(self.sql.exec(&sql, &params)?)
    }

    fn insert_records(&self, records: &[RuleRecord]) -> Result<u64, PolicyError> {
        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK) {
            let mut rows = Vec::with_capacity(chunk.len());
            let mut params = Vec::with_capacity(chunk.len() * (1 + VALUE_COLUMNS));
            for record in chunk {
                let first = params.len() + 1;
                let placeholders: Vec<String> = (first..first + 1 + VALUE_COLUMNS)
                    .map(|n| format!("?{}", n))
                    .collect();
                rows.push(format!("({})", placeholders.join(", ")));
                params.push(Value::Text(record.ptype.clone()));
                params.extend(record.values.iter().map(|v| Value::Text(v.clone())));
            }
            let sql = format!(
                "INSERT INTO \"{}\" ({}) VALUES {}",
                self.table_name(),
                RULE_COLUMNS,
                rows.join(", ")
            );
            inserted += self.sql.exec(&sql, &params)?;
        }
        Ok(inserted)
    }
}

/// Build the stored record for a rule, warning when values past `v5` are dropped.
fn record_for<S: AsRef<str>>(ptype: &str, rule: &[S]) -> RuleRecord {
    if rule.len() > VALUE_COLUMNS {
        warn!(
            "SqlAdapter: rule for {:?} has {} values, keeping the first {}",
            ptype,
            rule.len(),
            VALUE_COLUMNS
        );
    }
    RuleRecord::from_rule(ptype, rule)
}
