//! Rule descriptors, rulesets and the registry.

use crate::context::Context;
use crate::error::CheckError;
use crate::pointer::Pointer;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// A located finding produced by a check.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    pub description: String,
    pub pointer: Option<Pointer>,
}

impl Violation {
    pub fn new(description: impl Into<String>, pointer: Option<Pointer>) -> Self {
        Violation {
            description: description.into(),
            pointer,
        }
    }
}

/// Severity tiers, most severe first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Must,
    Should,
    May,
    Hint,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Must => "MUST",
            Severity::Should => "SHOULD",
            Severity::May => "MAY",
            Severity::Hint => "HINT",
        }
    }

    /// Case-insensitive lookup of a tier name.
    pub fn from_name(name: &str) -> Option<Severity> {
        [Severity::Must, Severity::Should, Severity::May, Severity::Hint]
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signature of a check function.
pub type CheckFn = fn(&Context) -> Result<Vec<Violation>, CheckError>;

/// One check of a rule. Most rules have exactly one.
#[derive(Clone, Copy, Debug)]
pub struct Check {
    pub name: &'static str,
    pub severity: Severity,
    pub run: CheckFn,
}

/// A named group of rules sharing ownership and policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RuleSet {
    pub id: &'static str,
    pub title: &'static str,
    pub url: Option<&'static str>,
}

/// Static metadata of a rule plus its checks.
#[derive(Clone, Copy, Debug)]
pub struct RuleDescriptor {
    pub id: &'static str,
    pub title: &'static str,
    pub severity: Severity,
    pub ruleset: &'static RuleSet,
    pub checks: &'static [Check],
}

/// Explicitly registered rules, in registration order.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    rules: Vec<RuleDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// A registry holding the built-in rule catalogue.
    pub fn with_builtin_rules() -> Self {
        let mut registry = Registry::new();
        for rule in crate::rules::BUILTIN {
            registry.register(*rule);
        }
        registry
    }

    /// Adds `rule`. A rule with the same id replaces the earlier one in place.
    pub fn register(&mut self, rule: RuleDescriptor) {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => {
                warn!(rule = rule.id, "rule registered twice, replacing");
                *existing = rule;
            }
            None => self.rules.push(rule),
        }
    }

    pub fn rules(&self) -> &[RuleDescriptor] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&RuleDescriptor> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rulesets in order of first appearance.
    pub fn rulesets(&self) -> Vec<&'static RuleSet> {
        let mut sets: Vec<&'static RuleSet> = Vec::new();
        for rule in &self.rules {
            if !sets.iter().any(|s| s.id == rule.ruleset.id) {
                sets.push(rule.ruleset);
            }
        }
        sets
    }

    /// Rules owned by the ruleset `id`.
    pub fn by_ruleset(&self, id: &str) -> Vec<&RuleDescriptor> {
        self.rules.iter().filter(|r| r.ruleset.id == id).collect()
    }
}
