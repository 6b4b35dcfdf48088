use tracing::info;

use crate::error::PolicyError;
use crate::model::Column;
use crate::service::SqlAdapter;

const ALL_COLUMNS: [Column; 7] = [
    Column::Ptype,
    Column::V0,
    Column::V1,
    Column::V2,
    Column::V3,
    Column::V4,
    Column::V5,
];

/// DDL for the rule table: surrogate `id`, then `ptype` and `v0`..`v5` as
/// indexed `TEXT NOT NULL DEFAULT ''`.
fn create_table_sql(table: &str) -> String {
    let columns: Vec<String> = ALL_COLUMNS
        .iter()
        .map(|c| format!("    \"{}\" TEXT NOT NULL DEFAULT ''", c.name()))
        .collect();
    let mut sql = format!(
        "CREATE TABLE IF NOT EXISTS \"{}\" (\n    id INTEGER PRIMARY KEY AUTOINCREMENT,\n{}\n);\n",
        table,
        columns.join(",\n")
    );
    for c in ALL_COLUMNS {
        sql.push_str(&format!(
            "CREATE INDEX IF NOT EXISTS \"idx_{}_{}\" ON \"{}\" (\"{}\");\n",
            table,
            c.name(),
            table,
            c.name()
        ));
    }
    sql
}

impl SqlAdapter {
    /// Create the rule table and its indexes if they do not exist.
    pub fn create_table(&self) -> Result<(), PolicyError> {
        if !self.has_table()? {
            info!("SqlAdapter: creating table {:?}", self.table_name());
        }
        self.sql.exec_batch(&create_table_sql(self.table_name()))?;
        Ok(())
    }

    /// Drop the rule table (and with it, its indexes) if it exists.
    pub fn drop_table(&self) -> Result<(), PolicyError> {
        info!("SqlAdapter: dropping table {:?}", self.table_name());
        self.sql
            .exec_batch(&format!("DROP TABLE IF EXISTS \"{}\";", self.table_name()))?;
        Ok(())
    }

    pub fn has_table(&self) -> Result<bool, PolicyError> {
        let rows = self.sql.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
            &[self.table_name().into()],
        )?;
        Ok(!rows.is_empty())
    }
}
