use crate::context::Context;
use crate::error::CheckError;
use crate::rule::{Check, RuleDescriptor, Severity, Violation};
use std::collections::HashSet;

pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "110",
    title: "Response As JSON Object",
    severity: Severity::Must,
    ruleset: &super::GUIDELINES,
    checks: &[Check {
        name: "json-object-success-response",
        severity: Severity::Must,
        run: check,
    }],
};

const DESCRIPTION: &str =
    "Always return JSON objects as top-level data structures to support extensibility";

fn is_success(code: &str) -> bool {
    code.parse::<u16>().is_ok_and(|c| (200..300).contains(&c))
}

/// Success responses with a JSON media type must declare an object schema.
/// Schemas without a `type` are not judged. A schema shared by several
/// media types or responses is reported once.
fn check(context: &Context) -> Result<Vec<Violation>, CheckError> {
    let mut seen = HashSet::new();
    Ok(context.validate_operations(
        |_, _, _| true,
        |_, _, op| {
            op.responses()
                .into_iter()
                .filter(|(code, _)| is_success(code))
                .flat_map(|(_, response)| response.content())
                .filter(|(media, _)| media.contains("json"))
                .filter_map(|(_, media)| media.schema())
                .filter(|schema| {
                    schema
                        .node()
                        .as_schema()
                        .and_then(|s| s.schema_type.as_deref())
                        .is_some_and(|t| !t.is_empty() && t != "object")
                })
                .filter(|schema| seen.insert(schema.id()))
                .map(|schema| context.violation(DESCRIPTION, schema.id()))
                .collect::<Vec<_>>()
        },
    ))
}
