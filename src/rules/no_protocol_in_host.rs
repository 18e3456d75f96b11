use crate::context::Context;
use crate::error::CheckError;
use crate::rule::{Check, RuleDescriptor, Severity, Violation};

pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "M008",
    title: "Host should not contain protocol",
    severity: Severity::Must,
    ruleset: &super::BASE,
    checks: &[Check {
        name: "no-protocol-in-host",
        severity: Severity::Must,
        run: check,
    }],
};

fn check(context: &Context) -> Result<Vec<Violation>, CheckError> {
    Ok(context
        .api()
        .servers()
        .into_iter()
        .filter_map(|server| {
            let url = &server.node().as_server()?.url;
            url.contains("://").then(|| {
                context.violation(
                    format!(
                        "Information about protocol should be placed in schema. Current host value '{}' violates this rule",
                        url
                    ),
                    &server,
                )
            })
        })
        .collect())
}
