use std::collections::BTreeMap;

use tracing::debug;

/// In-memory policy model: section (`p`, `g`) → policy type (`p`, `g2`, ..)
/// → rules.
///
/// Only policy types declared with [`PolicyModel::add_assertion`] accept
/// rules; lines for unknown types are skipped, as the enforcer's own model does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyModel {
    sections: BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>,
}

/// Section key of a policy type: its first character (`g2` → `g`).
fn section_of(ptype: &str) -> &str {
    match ptype.char_indices().nth(1) {
        Some((i, _)) => &ptype[..i],
        None => ptype,
    }
}

impl PolicyModel {
    /// A model declaring the basic `p` and `g` policy types.
    pub fn new() -> Self {
        let mut model = Self::default();
        model.add_assertion("p");
        model.add_assertion("g");
        model
    }

    /// Declare a policy type. Existing rules of that type are kept.
    pub fn add_assertion(&mut self, ptype: &str) {
        if ptype.is_empty() {
            return;
        }
        self.sections
            .entry(section_of(ptype).to_string())
            .or_default()
            .entry(ptype.to_string())
            .or_default();
    }

    fn assertion_mut(&mut self, ptype: &str) -> Option<&mut Vec<Vec<String>>> {
        self.sections
            .get_mut(section_of(ptype))
            .and_then(|s| s.get_mut(ptype))
    }

    /// Parse one `ptype, v0, v1, ...` line and append its rule.
    /// Returns false when the line is empty or its policy type is not declared.
    pub fn load_policy_line(&mut self, line: &str) -> bool {
        let mut tokens = line.split(',').map(str::trim);
        let ptype = match tokens.next() {
            Some(t) if !t.is_empty() => t,
            _ => return false,
        };
        let rule: Vec<String> = tokens.map(str::to_string).collect();
        match self.assertion_mut(ptype) {
            Some(rules) => {
                rules.push(rule);
                true
            }
            None => {
                debug!("PolicyModel: skipping line for undeclared ptype {:?}", ptype);
                false
            }
        }
    }

    /// Add a rule unless it is already present. Returns whether it was added.
    pub fn add_policy(&mut self, ptype: &str, rule: Vec<String>) -> bool {
        match self.assertion_mut(ptype) {
            Some(rules) if !rules.contains(&rule) => {
                rules.push(rule);
                true
            }
            _ => false,
        }
    }

    pub fn has_policy<S: AsRef<str>>(&self, ptype: &str, rule: &[S]) -> bool {
        self.policies(ptype).iter().any(|r| {
            r.len() == rule.len()
                && r.iter().zip(rule).all(|(a, b)| {
                    let b: &str = b.as_ref();
                    a == b
                })
        })
    }

    /// Rules of one policy type (empty if undeclared).
    pub fn policies(&self, ptype: &str) -> &[Vec<String>] {
        self.sections
            .get(section_of(ptype))
            .and_then(|s| s.get(ptype))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every `(ptype, rule)` in the `p` and `g` sections.
    pub fn rules(&self) -> impl Iterator<Item = (&str, &[String])> {
        ["p", "g"]
            .into_iter()
            .filter_map(|sec| self.sections.get(sec))
            .flat_map(|assertions| assertions.iter())
            .flat_map(|(ptype, rules)| rules.iter().map(move |r| (ptype.as_str(), r.as_slice())))
    }

    /// Drop every rule, keeping the declared policy types.
    pub fn clear_policy(&mut self) {
        for assertions in self.sections.values_mut() {
            for rules in assertions.values_mut() {
                rules.clear();
            }
        }
    }
}
