//! Built-in rule catalogue.
//!
//! Each rule is a leaf consumer of the [`Context`](crate::context::Context)
//! traversal API: it enumerates the nodes it cares about and reports them.

use crate::rule::{RuleDescriptor, RuleSet};

pub mod extensible_enum;
pub mod kebab_case_paths;
pub mod no_protocol_in_host;
pub mod no_unused_definitions;
pub mod success_response_as_json_object;

/// API design guidelines.
pub const GUIDELINES: RuleSet = RuleSet {
    id: "guidelines",
    title: "RESTful API guidelines",
    url: Some("https://opensource.zalando.com/restful-api-guidelines/"),
};

/// Structural hygiene rules that apply to any API.
pub const BASE: RuleSet = RuleSet {
    id: "base",
    title: "Base rules",
    url: None,
};

/// Every built-in rule, in registration order.
pub const BUILTIN: &[RuleDescriptor] = &[
    extensible_enum::RULE,
    success_response_as_json_object::RULE,
    kebab_case_paths::RULE,
    no_protocol_in_host::RULE,
    no_unused_definitions::RULE,
];
