use crate::context::Context;
use crate::error::CheckError;
use crate::patterns::{is_kebab_case, is_path_variable};
use crate::rule::{Check, RuleDescriptor, Severity, Violation};

pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "129",
    title: "Lowercase words with hyphens",
    severity: Severity::Must,
    ruleset: &super::GUIDELINES,
    checks: &[Check {
        name: "kebab-case-path-segments",
        severity: Severity::Must,
        run: check,
    }],
};

fn check(context: &Context) -> Result<Vec<Violation>, CheckError> {
    Ok(context.validate_paths(
        |_, _| true,
        |path, item| {
            path.split('/')
                .filter(|segment| !segment.is_empty() && !is_path_variable(segment))
                .find(|segment| !is_kebab_case(segment))
                .map(|segment| {
                    context.violation(
                        format!(
                            "Use lowercase separate words with hyphens for path segments: '{}'",
                            segment
                        ),
                        item,
                    )
                })
        },
    ))
}
