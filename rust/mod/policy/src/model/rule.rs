use serde::{Deserialize, Serialize};

use rulestore_sql::Row;

/// Number of positional value columns (`v0`..`v5`).
pub const VALUE_COLUMNS: usize = 6;

/// Separator between fields of a policy line.
const LINE_SEPARATOR: &str = ", ";

/// A column of the rule table that predicates can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Ptype,
    V0,
    V1,
    V2,
    V3,
    V4,
    V5,
}

impl Column {
    /// Value columns in positional order.
    pub const VALUES: [Column; VALUE_COLUMNS] = [
        Column::V0,
        Column::V1,
        Column::V2,
        Column::V3,
        Column::V4,
        Column::V5,
    ];

    /// The value column at a rule position, or None past `v5`.
    pub fn value(index: usize) -> Option<Column> {
        Self::VALUES.get(index).copied()
    }

    /// SQL column name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Ptype => "ptype",
            Column::V0 => "v0",
            Column::V1 => "v1",
            Column::V2 => "v2",
            Column::V3 => "v3",
            Column::V4 => "v4",
            Column::V5 => "v5",
        }
    }
}

/// One persisted policy rule.
///
/// Unused value slots hold `""`, never NULL, so equality and emptiness checks
/// behave the same for every column.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleRecord {
    pub ptype: String,
    pub values: [String; VALUE_COLUMNS],
}

impl RuleRecord {
    /// Build a record from a rule tuple. Values past `v5` are dropped.
    pub fn from_rule<S: AsRef<str>>(ptype: &str, rule: &[S]) -> Self {
        let mut record = RuleRecord {
            ptype: ptype.to_string(),
            ..Default::default()
        };
        for (slot, value) in record.values.iter_mut().zip(rule) {
            let value: &str = value.as_ref();
            *slot = value.to_string();
        }
        record
    }

    /// Build a record from a `SELECT ptype, v0, .., v5` row.
    pub fn from_row(row: &Row) -> Self {
        let mut record = RuleRecord {
            ptype: row.get_str_or_empty(Column::Ptype.name()).to_string(),
            ..Default::default()
        };
        for (slot, column) in record.values.iter_mut().zip(Column::VALUES) {
            *slot = row.get_str_or_empty(column.name()).to_string();
        }
        record
    }

    /// The value held in a column.
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::Ptype => &self.ptype,
            Column::V0 => &self.values[0],
            Column::V1 => &self.values[1],
            Column::V2 => &self.values[2],
            Column::V3 => &self.values[3],
            Column::V4 => &self.values[4],
            Column::V5 => &self.values[5],
        }
    }

    /// The non-empty values, in column order.
    pub fn rule(&self) -> Vec<String> {
        self.values
            .iter()
            .filter(|v| !v.is_empty())
            .cloned()
            .collect()
    }

    /// Serialize to the engine's policy-line format: `ptype, v0, v1, ...`.
    ///
    /// Empty slots are left out entirely, wherever they occur. The engine's
    /// line parser is positional by presence, not by slot.
    pub fn to_policy_line(&self) -> String {
        let mut fields = Vec::with_capacity(1 + VALUE_COLUMNS);
        fields.push(self.ptype.as_str());
        fields.extend(self.values.iter().map(String::as_str).filter(|v| !v.is_empty()));
        fields.join(LINE_SEPARATOR)
    }
}
