//! A filter must select the same rows whether the predicate runs as SQL or
//! is evaluated in memory over every record.

use std::sync::Arc;

use policy::{build, interpret, AdapterConfig, Filter, RuleRecord, SqlAdapter};
use rulestore_sql::{SQLStore, SqliteStore};

const FIXTURE: &[(&str, &[&str])] = &[
    ("p", &["alice", "data1", "read"]),
    ("p", &["alice", "data2", "write"]),
    ("p", &["Alice", "DATA-1", "read"]),
    ("p", &["bob", "data-2", "update"]),
    ("p", &["bob", "data_3", "delete"]),
    ("p", &["carol", "", "read", "tenant1"]),
    ("p2", &["alice", "data1", "read"]),
    ("g", &["alice", "admin"]),
    ("g", &["bob", "admin", "tenant1"]),
    ("g2", &["carol", "group-x"]),
];

fn seeded() -> SqlAdapter {
    let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
    let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
    for &(ptype, rule) in FIXTURE {
        adapter.add(ptype, rule).unwrap();
    }
    adapter
}

fn filters() -> Vec<Filter> {
    vec![
        Filter::new(),
        Filter::new().ptype("p", ["", "data1"]),
        Filter::new().ptype("p", ["like:alice"]),
        Filter::new().ptype("p", ["", "like:data-%"]),
        Filter::new().ptype("p", ["", "like:data_%"]),
        Filter::new().ptype("p", ["", "", "regex:^(read|update)$"]),
        Filter::new().ptype("p", ["regex:^[a-z]+$", "regex:\\d"]),
        Filter::new().ptype("p", ["", "", "", "tenant1"]),
        Filter::new().ptype("p", ["bob"]).ptype("g", ["", "admin"]),
        Filter::new()
            .ptype("p", Vec::<String>::new())
            .ptype("g", ["bob"])
            .ptype("g2", ["like:CAROL"]),
        Filter::new().ptype("p2", ["alice", "data1", "read", "", "", "", "ignored"]),
        Filter::from_json(r#"{"p": [null, "data2", null]}"#).unwrap(),
    ]
}

#[test]
fn sql_and_in_memory_agree() {
    let adapter = seeded();
    let everything = adapter.load_all().unwrap();
    assert_eq!(everything.len(), FIXTURE.len());

    for filter in filters() {
        let predicate = build(&interpret(&filter));
        let from_sql = adapter.load_filtered(&filter).unwrap();
        let in_memory = predicate.select(everything.clone()).unwrap();
        assert_eq!(from_sql, in_memory, "filter {:?}", filter);
    }
}

#[test]
fn ptype_branch_order_does_not_change_selection() {
    let adapter = seeded();
    let forward = Filter::from_json(r#"{"p": ["bob"], "g": ["", "admin"]}"#).unwrap();
    let reverse = Filter::from_json(r#"{"g": ["", "admin"], "p": ["bob"]}"#).unwrap();

    let mut a = adapter.load_filtered(&forward).unwrap();
    let mut b = adapter.load_filtered(&reverse).unwrap();
    a.sort();
    b.sort();
    assert_eq!(a, b);
    assert_eq!(a.len(), 4);
}

#[test]
fn like_is_case_insensitive_in_both_paths() {
    let adapter = seeded();
    let filter = Filter::new().ptype("p", ["like:ALICE", "like:data-1"]);
    let expected = vec![RuleRecord::from_rule("p", &["Alice", "DATA-1", "read"])];
    assert_eq!(adapter.load_filtered(&filter).unwrap(), expected);

    let predicate = build(&interpret(&filter));
    assert_eq!(predicate.select(adapter.load_all().unwrap()).unwrap(), expected);
}
