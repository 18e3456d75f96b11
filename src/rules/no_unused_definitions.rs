use crate::context::Context;
use crate::error::CheckError;
use crate::model::{Document, NodeId};
use crate::resolve::{Target, follow};
use crate::rule::{Check, RuleDescriptor, Severity, Violation};
use crate::walk::{path_schemas, schema_roots, walk_schemas};
use std::collections::HashSet;

pub const RULE: RuleDescriptor = RuleDescriptor {
    id: "S005",
    title: "Do not leave unused definitions",
    severity: Severity::Should,
    ruleset: &super::BASE,
    checks: &[Check {
        name: "unused-definitions",
        severity: Severity::Should,
        run: check,
    }],
};

/// Component schemas and parameters nothing points at. References are
/// already collapsed, so usage is decided by node identity.
fn check(context: &Context) -> Result<Vec<Violation>, CheckError> {
    let doc = context.document();
    let Some(components) = doc.components() else {
        return Ok(Vec::new());
    };

    let used_parameters = used_parameters(doc);
    let used_schemas = used_schemas(doc);

    let mut violations = Vec::new();
    for (_, id) in &components.parameters {
        if used_parameters.contains(id) || doc.node(*id).reference().is_some() {
            continue;
        }
        if let Some(pointer) = context.pointer_for(*id) {
            violations.push(context.violation(
                format!("Unused parameter definition: {}", pointer),
                *id,
            ));
        }
    }
    for (_, id) in &components.schemas {
        // Aliases are never the target of a collapsed reference.
        if used_schemas.contains(id) || doc.node(*id).reference().is_some() {
            continue;
        }
        if let Some(pointer) = context.pointer_for(*id) {
            violations.push(context.violation(
                format!("Unused schema definition: {}", pointer),
                *id,
            ));
        }
    }
    Ok(violations)
}

fn used_parameters(doc: &Document) -> HashSet<NodeId> {
    let mut used = HashSet::new();
    for (_, item_id) in &doc.root().paths {
        let Some(item) = doc.node(*item_id).as_path_item() else {
            continue;
        };
        used.extend(item.parameters.iter().copied());
        for (_, op) in &item.operations {
            if let Some(op) = doc.node(*op).as_operation() {
                used.extend(op.parameters.iter().copied());
            }
        }
    }
    used
}

fn used_schemas(doc: &Document) -> HashSet<NodeId> {
    let mut used: HashSet<NodeId> = path_schemas(doc).map(|info| info.schema).collect();
    let Some(components) = doc.components() else {
        return used;
    };
    for (_, id) in &components.schemas {
        match doc.node(*id).reference() {
            Some(_) => {
                if let Target::Concrete(target) = follow(doc, *id) {
                    used.extend(walk_schemas(doc, target, true).map(|info| info.schema));
                }
            }
            None => used.extend(walk_schemas(doc, *id, false).map(|info| info.schema)),
        }
    }
    for (_, id) in components
        .parameters
        .iter()
        .chain(&components.responses)
        .chain(&components.request_bodies)
        .chain(&components.headers)
    {
        for root in schema_roots(doc, *id) {
            used.extend(walk_schemas(doc, root.schema, true).map(|info| info.schema));
        }
    }
    used
}
