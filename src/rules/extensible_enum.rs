use crate::context::Context;
use crate::error::CheckError;
use crate::rule::{Check, RuleDescriptor, Severity, Violation};
use crate::walk::all_schemas;

pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "107",
    title: "Prefer Compatible Extensions",
    severity: Severity::Should,
    ruleset: &super::GUIDELINES,
    checks: &[Check {
        name: "extensible-enum",
        severity: Severity::Should,
        run: check,
    }],
};

const DESCRIPTION: &str = "Schema is not an extensible enum";

/// Flags every schema with a closed `enum` list.
fn check(context: &Context) -> Result<Vec<Violation>, CheckError> {
    let doc = context.document();
    Ok(all_schemas(doc)
        .filter(|info| doc.schema(info.schema).is_some_and(|s| s.is_enum()))
        .map(|info| context.violation(DESCRIPTION, info.schema))
        .collect())
}
