use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{bail, Context};
use policy::{Filter, RuleRecord, SqlAdapter};
use tracing::info;

/// `lines` prints one policy line per rule, `json` a JSON array of records.
pub fn is_json(output: &str) -> anyhow::Result<bool> {
    match output {
        "lines" => Ok(false),
        "json" => Ok(true),
        other => bail!("unknown output format {:?} (expected lines or json)", other),
    }
}

pub fn list(adapter: &SqlAdapter, json: bool) -> anyhow::Result<()> {
    let records = adapter.load_all()?;
    print_records(&records, json)
}

pub fn filter(adapter: &SqlAdapter, filter: &str, json: bool) -> anyhow::Result<()> {
    let filter = Filter::from_json(filter)?;
    let records = adapter.load_filtered(&filter)?;
    info!("{} rules matched", records.len());
    print_records(&records, json)
}

pub fn add(adapter: &SqlAdapter, ptype: &str, values: &[String]) -> anyhow::Result<()> {
    adapter.add(ptype, values)?;
    println!("added {}", RuleRecord::from_rule(ptype, values).to_policy_line());
    Ok(())
}

pub fn remove(adapter: &SqlAdapter, ptype: &str, values: &[String]) -> anyhow::Result<()> {
    let removed = adapter.remove(ptype, values)?;
    println!("removed {} rules", removed);
    Ok(())
}

pub fn remove_filtered(
    adapter: &SqlAdapter,
    ptype: &str,
    field_index: usize,
    values: &[String],
) -> anyhow::Result<()> {
    let removed = adapter.remove_filtered(ptype, field_index, values)?;
    println!("removed {} rules", removed);
    Ok(())
}

pub fn import(adapter: &SqlAdapter, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let rules = parse_policy_lines(&content)?;
    if !adapter.save_all(&rules)? {
        bail!("import failed, the rule table may be partially filled");
    }
    println!("imported {} rules", rules.len());
    Ok(())
}

pub fn drop_table(adapter: &SqlAdapter, yes: bool) -> anyhow::Result<()> {
    if !yes && !confirm(&format!("Drop table {:?}?", adapter.table_name()))? {
        println!("aborted");
        return Ok(());
    }
    adapter.drop_table()?;
    println!("dropped {}", adapter.table_name());
    Ok(())
}

fn print_records(records: &[RuleRecord], json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else {
        for record in records {
            println!("{}", record.to_policy_line());
        }
    }
    Ok(())
}

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

/// Parse `ptype, v0, v1, ...` lines. Blank lines and `#` comments are skipped.
pub fn parse_policy_lines(content: &str) -> anyhow::Result<Vec<(String, Vec<String>)>> {
    let mut rules = Vec::new();
    for (n, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split(',').map(str::trim);
        let ptype = fields.next().unwrap_or_default();
        if ptype.is_empty() {
            bail!("line {}: missing policy type", n + 1);
        }
        rules.push((ptype.to_string(), fields.map(str::to_string).collect()));
    }
    Ok(rules)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use policy::AdapterConfig;
    use rulestore_sql::{SQLStore, SqliteStore};

    use super::*;

    #[test]
    fn test_parse_policy_lines() {
        let content = "# rules\np, alice, data1, read\n\ng,bob ,admin\n";
        let rules = parse_policy_lines(content).unwrap();
        assert_eq!(
            rules,
            vec![
                (
                    "p".to_string(),
                    vec!["alice".to_string(), "data1".to_string(), "read".to_string()]
                ),
                ("g".to_string(), vec!["bob".to_string(), "admin".to_string()]),
            ]
        );
    }

    #[test]
    fn test_parse_rejects_missing_ptype() {
        let err = parse_policy_lines("p, a\n, b\n").unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_output_formats() {
        assert!(!is_json("lines").unwrap());
        assert!(is_json("json").unwrap());
        assert!(is_json("yaml").is_err());
    }

    #[test]
    fn test_import_replaces_rules() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("policy.sqlite");
        let file = dir.path().join("policy.csv");
        std::fs::write(&file, "p, alice, data1, read\np, bob, data2, write\n").unwrap();

        let sql: Arc<dyn SQLStore> = Arc::new(SqliteStore::open(&db).unwrap());
        let adapter = SqlAdapter::new(sql, AdapterConfig::default()).unwrap();
        adapter.add("p", &["old"]).unwrap();

        import(&adapter, &file).unwrap();
        let lines: Vec<String> = adapter
            .load_all()
            .unwrap()
            .iter()
            .map(RuleRecord::to_policy_line)
            .collect();
        assert_eq!(lines, vec!["p, alice, data1, read", "p, bob, data2, write"]);
    }
}
