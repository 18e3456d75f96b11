//! Runs registered rules over a context and aggregates their findings.

use crate::config::LintConfig;
use crate::context::Context;
use crate::pointer::Pointer;
use crate::rule::{Check, Registry, RuleDescriptor, Severity, Violation};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, warn};

/// A violation attributed to the rule that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Finding {
    pub rule_id: String,
    pub title: String,
    pub ruleset: String,
    pub severity: Severity,
    pub description: String,
    pub pointer: Option<Pointer>,
}

/// A check that returned an error or panicked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleFailure {
    pub rule_id: String,
    pub check: String,
    pub message: String,
}

/// Aggregated result of one run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// In rule order, then emission order.
    pub violations: Vec<Finding>,
    pub failures: Vec<RuleFailure>,
}

impl Report {
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.failures.is_empty()
    }

    /// Findings of one rule.
    pub fn for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Finding> + 'a {
        self.violations.iter().filter(move |f| f.rule_id == rule_id)
    }
}

pub struct Executor<'r> {
    registry: &'r Registry,
    config: LintConfig,
}

impl<'r> Executor<'r> {
    pub fn new(registry: &'r Registry, config: LintConfig) -> Self {
        Executor { registry, config }
    }

    pub fn config(&self) -> &LintConfig {
        &self.config
    }

    /// Invokes every enabled check sequentially, in registration order.
    pub fn run(&self, context: &Context) -> Report {
        let mut report = Report::default();
        for rule in self.registry.rules() {
            if !self.config.is_enabled(rule) {
                debug!(rule = rule.id, "rule disabled");
                continue;
            }
            for check in rule.checks {
                if !self.config.allows(check.severity) {
                    continue;
                }
                match invoke(context, check) {
                    Ok(violations) => {
                        let before = report.violations.len();
                        report.violations.extend(
                            violations
                                .into_iter()
                                .filter(|v| !ignored(context, rule, v))
                                .map(|v| finding(rule, check, v)),
                        );
                        debug!(
                            rule = rule.id,
                            check = check.name,
                            found = report.violations.len() - before,
                            "check finished"
                        );
                    }
                    Err(message) => {
                        warn!(rule = rule.id, check = check.name, %message, "check failed");
                        report.failures.push(RuleFailure {
                            rule_id: rule.id.to_string(),
                            check: check.name.to_string(),
                            message,
                        });
                    }
                }
            }
        }
        report
    }
}

fn invoke(context: &Context, check: &Check) -> Result<Vec<Violation>, String> {
    context.reset_trace();
    match catch_unwind(AssertUnwindSafe(|| (check.run)(context))) {
        Ok(Ok(violations)) => Ok(violations),
        Ok(Err(error)) => Err(error.to_string()),
        Err(payload) => Err(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("check panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("check panicked: {}", message)
    } else {
        "check panicked".to_string()
    }
}

fn ignored(context: &Context, rule: &RuleDescriptor, violation: &Violation) -> bool {
    violation
        .pointer
        .as_ref()
        .is_some_and(|pointer| context.is_ignored(pointer, rule.id))
}

fn finding(rule: &RuleDescriptor, check: &Check, violation: Violation) -> Finding {
    Finding {
        rule_id: rule.id.to_string(),
        title: rule.title.to_string(),
        ruleset: rule.ruleset.id.to_string(),
        severity: check.severity,
        description: violation.description,
        pointer: violation.pointer,
    }
}
