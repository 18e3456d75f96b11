//! Rule-based linter core for OpenAPI 3 and Swagger 2 documents.
//!
//! The crate turns a document into an addressable tree and runs independent
//! rules over it, producing violations located by JSON pointer:
//!
//! ```text
//! parse(text) → [convert (Swagger 2)] → build → resolve → ReverseIndex
//!             → Context → Executor::run(rules) → Report
//! ```
//!
//! Swagger 2 input is converted to the OpenAPI 3 shape, but findings are
//! reported against the pointers of the document that was actually written.
//!
//! # Quick Start
//!
//! ```rust
//! let yaml = r#"
//! openapi: 3.0.0
//! info:
//!   title: Pets
//!   version: "1.0"
//! servers:
//!   - url: https://example.com
//! paths: {}
//! "#;
//!
//! let registry = oaslint::Registry::with_builtin_rules();
//! let report = oaslint::lint(yaml, &registry, &oaslint::LintConfig::default())
//!     .expect("valid document");
//! assert_eq!(report.violations.len(), 1);
//! assert_eq!(report.violations[0].rule_id, "M008");
//! ```
//!
//! # Writing a rule
//!
//! A check receives the [`Context`] and returns violations. Navigating
//! through [`Context::api`] records the last visited node, so
//! [`Context::violation_here`] needs only a description:
//!
//! ```rust
//! use oaslint::{Check, Context, CheckError, RuleDescriptor, RuleSet, Severity, Violation};
//!
//! const TEAM: RuleSet = RuleSet { id: "team", title: "Team rules", url: None };
//!
//! fn title_required(context: &Context) -> Result<Vec<Violation>, CheckError> {
//!     let api = context.api();
//!     let Some(info) = api.info() else {
//!         return Ok(Vec::new());
//!     };
//!     match info.node().as_info().and_then(|i| i.title.as_deref()) {
//!         Some(_) => Ok(Vec::new()),
//!         None => Ok(vec![context.violation_here("API title is missing")]),
//!     }
//! }
//!
//! const TITLE_REQUIRED: RuleDescriptor = RuleDescriptor {
//!     id: "T001",
//!     title: "Title required",
//!     severity: Severity::Must,
//!     ruleset: &TEAM,
//!     checks: &[Check { name: "title", severity: Severity::Must, run: title_required }],
//! };
//!
//! let mut registry = oaslint::Registry::new();
//! registry.register(TITLE_REQUIRED);
//! ```

pub mod build;
pub mod config;
pub mod context;
pub mod convert;
pub mod error;
pub mod executor;
pub mod index;
pub mod model;
pub mod parse;
pub mod patterns;
pub mod pointer;
pub mod recorder;
pub mod resolve;
pub mod rule;
pub mod rules;
pub mod serialize;
pub mod walk;

pub use config::LintConfig;
pub use context::{Context, Locate};
pub use error::*;
pub use executor::{Executor, Finding, Report, RuleFailure};
pub use model::{Document, Method, Node, NodeId};
pub use parse::{Dialect, parse};
pub use pointer::Pointer;
pub use recorder::Tracked;
pub use rule::{Check, CheckFn, Registry, RuleDescriptor, RuleSet, Severity, Violation};

/// Convenience entry point composing parse → context → execution.
///
/// Detects the dialect from the root `openapi` / `swagger` key.
///
/// # Errors
///
/// Returns the [`ParseError`] when no context can be built from `input`.
pub fn lint(input: &str, registry: &Registry, config: &LintConfig) -> Result<Report, ParseError> {
    let context = Context::from_text(input)?;
    Ok(Executor::new(registry, config.clone()).run(&context))
}
