//! End-to-end behaviour of the SQLite-backed adapter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use policy::{Adapter, AdapterConfig, Filter, FilteredAdapter, PolicyModel, RuleRecord, SqlAdapter};
use rulestore_sql::{Row, SQLError, SQLStore, SqliteStore, Value};

fn adapter_with(rules: &[(&str, &[&str])]) -> SqlAdapter {
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
    for &(ptype, rule) in rules {
        adapter.add(ptype, rule).unwrap();
    }
    adapter
}

fn lines(records: &[RuleRecord]) -> Vec<String> {
    records.iter().map(RuleRecord::to_policy_line).collect()
}

#[test]
fn filtered_load_by_exact_value() {
    let adapter = adapter_with(&[
        ("p", &["alice", "data1", "read"]),
        ("p", &["alice", "data2", "read"]),
        ("p", &["bob", "data1", "read"]),
    ]);

    let filter = Filter::from_json(r#"{"p": ["", "data1"], "g": []}"#).unwrap();
    let mut model = PolicyModel::new();
    adapter.load_filtered_policy(&mut model, &filter).unwrap();

    assert!(model.has_policy("p", &["alice", "data1", "read"]));
    assert!(model.has_policy("p", &["bob", "data1", "read"]));
    assert!(!model.has_policy("p", &["alice", "data2", "read"]));
    assert!(adapter.is_filtered());
}

#[test]
fn filtered_load_with_like_and_regex() {
    let adapter = adapter_with(&[
        ("p", &["alice", "data-a", "update"]),
        ("p", &["alice", "data", "delete"]),
        ("p", &["bob", "data-b", "write"]),
        ("p", &["bob", "data-c", "save"]),
    ]);

    let filter = Filter::new()
        .ptype("p", ["", "like:data-%", "regex:(update|write)"])
        .ptype("g", Vec::<String>::new());
    let records = adapter.load_filtered(&filter).unwrap();

    assert_eq!(
        lines(&records),
        vec!["p, alice, data-a, update", "p, bob, data-b, write"]
    );
}

#[test]
fn filtered_load_combines_policy_types() {
    let adapter = adapter_with(&[
        ("p", &["alice", "data1", "read"]),
        ("p", &["bob", "data1", "read"]),
        ("g", &["alice", "admin"]),
        ("g", &["bob", "user"]),
        ("g2", &["alice", "tenant1"]),
    ]);

    let filter = Filter::new().ptype("p", ["bob"]).ptype("g", ["", "admin"]);
    let records = adapter.load_filtered(&filter).unwrap();
    assert_eq!(lines(&records), vec!["p, bob, data1, read", "g, alice, admin"]);
}

#[test]
fn filtered_load_is_repeatable_and_read_only() {
    let adapter = adapter_with(&[
        ("p", &["alice", "data1", "read"]),
        ("p", &["bob", "data2", "write"]),
    ]);
    let filter = Filter::new().ptype("p", ["like:A%"]);

    let first = adapter.load_filtered(&filter).unwrap();
    let second = adapter.load_filtered(&filter).unwrap();
    assert_eq!(first, second);
    assert_eq!(lines(&first), vec!["p, alice, data1, read"]);
    assert_eq!(adapter.load_all().unwrap().len(), 2);
}

#[test]
fn add_then_load_all_round_trip() {
    let adapter = adapter_with(&[]);
    adapter.add("g", &["alice", "admin"]).unwrap();

    let records = adapter.load_all().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].ptype, "g");
    assert_eq!(records[0].values, ["alice", "admin", "", "", "", ""]);
}

#[test]
fn remove_filtered_ignores_other_columns() {
    let adapter = adapter_with(&[
        ("p", &["alice", "data1", "read"]),
        ("p", &["bob", "data1", "write", "x"]),
        ("p", &["bob", "data2", "read"]),
        ("g", &["carol", "data1"]),
    ]);

    adapter
        .remove_filtered_policy("p", "p", 1, &["data1".to_string()])
        .unwrap();

    let records = adapter.load_all().unwrap();
    assert_eq!(lines(&records), vec!["p, bob, data2, read", "g, carol, data1"]);
}

/// Delegates to SQLite but fails every INSERT once armed.
struct FailingInserts {
    inner: SqliteStore,
    armed: AtomicBool,
}

impl SQLStore for FailingInserts {
    fn query(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SQLError> {
        self.inner.query(sql, params)
    }

    fn exec(&self, sql: &str, params: &[Value]) -> Result<u64, SQLError> {
        if self.armed.load(Ordering::SeqCst) && sql.starts_with("INSERT") {
            return Err(SQLError::Execution("disk I/O error".into()));
        }
        self.inner.exec(sql, params)
    }

    fn exec_batch(&self, sql: &str) -> Result<(), SQLError> {
        self.inner.exec_batch(sql)
    }
}

#[test]
fn save_failure_leaves_store_cleared() {
    let store = Arc::new(FailingInserts {
        inner: SqliteStore::open_in_memory().unwrap(),
        armed: AtomicBool::new(false),
    });
    let sql: Arc<dyn SQLStore> = store.clone();
    let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
    adapter.add("p", &["alice", "data1", "read"]).unwrap();
    adapter.add("p", &["bob", "data2", "write"]).unwrap();

    let mut model = PolicyModel::new();
    adapter.load_policy(&mut model).unwrap();
    model.load_policy_line("p, carol, data3, read");

    store.armed.store(true, Ordering::SeqCst);
    assert!(!adapter.save_policy(&model).unwrap());

    let after = adapter.load_all().unwrap();
    assert!(after.len() < model.rules().count());
    assert!(after.is_empty());
}

#[test]
fn single_row_writes_propagate_storage_errors() {
    let store = Arc::new(FailingInserts {
        inner: SqliteStore::open_in_memory().unwrap(),
        armed: AtomicBool::new(true),
    });
    let adapter = SqlAdapter::new(store, AdapterConfig::default()).unwrap();
    let err = adapter
        .add_policy("p", "p", &["alice".to_string()])
        .unwrap_err();
    assert_eq!(err.error_code(), "STORAGE_ERROR");
}

#[test]
fn filtered_load_from_database_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("policy.sqlite");
    {
        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open(&path).unwrap());
        let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
        adapter.add("p", &["alice", "data-1", "read"]).unwrap();
        adapter.add("p", &["alice", "data-2", "write"]).unwrap();
        adapter.add("p", &["bob", "other", "read"]).unwrap();
        adapter.add("g", &["alice", "admin"]).unwrap();
    }

    // Reopen: the rows must come back from the file, not a live connection.
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open(&path).unwrap());
    let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
    let filter = Filter::new()
        .ptype("p", ["", "like:DATA-%", "regex:^(read|update)$"])
        .ptype("g", ["alice"]);
    let records = adapter.load_filtered(&filter).unwrap();
    assert_eq!(lines(&records), vec!["p, alice, data-1, read", "g, alice, admin"]);
    assert_eq!(adapter.load_all().unwrap().len(), 4);
}
