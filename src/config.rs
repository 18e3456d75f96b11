//! Linter configuration.
//!
//! Read from a YAML (or JSON) document or from the environment:
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `OASLINT_DISABLED_RULES` | (none) | Comma-separated rule ids to skip |
//! | `OASLINT_DISABLED_RULESETS` | (none) | Comma-separated ruleset ids to skip |
//! | `OASLINT_MIN_SEVERITY` | `HINT` | Least severe tier still reported |

use crate::error::ConfigError;
use crate::rule::{RuleDescriptor, Severity};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LintConfig {
    pub disabled_rules: Vec<String>,
    pub disabled_rulesets: Vec<String>,
    /// Checks less severe than this are skipped.
    pub min_severity: Severity,
}

impl Default for LintConfig {
    fn default() -> Self {
        LintConfig {
            disabled_rules: Vec::new(),
            disabled_rulesets: Vec::new(),
            min_severity: Severity::Hint,
        }
    }
}

impl LintConfig {
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        if input.trim().is_empty() {
            return Ok(LintConfig::default());
        }
        serde_saphyr::from_str(input).map_err(|e| ConfigError {
            message: format!("invalid lint configuration: {}", e),
        })
    }

    /// Reads the `OASLINT_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        LintConfig::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`LintConfig::from_env`], with variables supplied by `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let min_severity = match lookup("OASLINT_MIN_SEVERITY") {
            Some(raw) => Severity::from_name(&raw).ok_or_else(|| ConfigError {
                message: format!(
                    "OASLINT_MIN_SEVERITY must be one of MUST, SHOULD, MAY, HINT (got '{}')",
                    raw
                ),
            })?,
            None => Severity::Hint,
        };
        Ok(LintConfig {
            disabled_rules: split_list(lookup("OASLINT_DISABLED_RULES")),
            disabled_rulesets: split_list(lookup("OASLINT_DISABLED_RULESETS")),
            min_severity,
        })
    }

    /// False when the rule or its ruleset is disabled.
    pub fn is_enabled(&self, rule: &RuleDescriptor) -> bool {
        !self.disabled_rules.iter().any(|id| id == rule.id)
            && !self.disabled_rulesets.iter().any(|id| id == rule.ruleset.id)
    }

    /// True when `severity` is at least as severe as the configured minimum.
    pub fn allows(&self, severity: Severity) -> bool {
        severity <= self.min_severity
    }
}

fn split_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}
