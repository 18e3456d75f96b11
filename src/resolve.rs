//! `$ref` collapsing and name back-fill.
//!
//! After [`resolve_references`] every typed edge that pointed at a reference
//! marker points at the concrete definition instead, so walkers and the
//! reverse index see shared identities and never follow a `$ref` themselves.
//! Component entries that are themselves aliases keep their marker node.

use crate::model::{Document, Node, NodeId};
use crate::pointer::Pointer;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Where a reference marker leads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// A node without a reference (possibly the start node itself).
    Concrete(NodeId),
    /// Non-local, malformed or missing target.
    Dangling(String),
    /// The chain is broken: wrong target kind or a cycle of references.
    Defect(String),
}

/// Outcome of one resolution pass.
#[derive(Clone, Debug, Default)]
pub struct Resolution {
    /// Number of edges redirected to a concrete target.
    pub rewritten: usize,
    /// `$ref` values that could not be resolved.
    pub dangling: Vec<String>,
    /// Broken chains, left untouched.
    pub defects: Vec<String>,
}

/// Follows the reference chain starting at `id`.
pub fn follow(doc: &Document, id: NodeId) -> Target {
    let kind = doc.node(id).kind();
    let mut visited = HashSet::new();
    let mut current = id;
    while let Some(reference) = doc.node(current).reference() {
        if !visited.insert(current) {
            return Target::Defect(format!("reference cycle through '{}'", reference));
        }
        let Some(target) = local_target(doc, reference) else {
            return Target::Dangling(reference.to_string());
        };
        let found = doc.node(target).kind();
        if found != kind {
            return Target::Defect(format!(
                "{} reference '{}' points at a {}",
                kind, reference, found
            ));
        }
        current = target;
    }
    Target::Concrete(current)
}

fn local_target(doc: &Document, reference: &str) -> Option<NodeId> {
    if !reference.starts_with("#/") {
        return None;
    }
    let pointer = Pointer::parse(reference).ok()?;
    doc.resolve(&pointer)
}

/// Redirects every typed edge that targets a reference marker to the
/// concrete node the marker resolves to. Running it again rewrites nothing.
pub fn resolve_references(doc: &mut Document) -> Resolution {
    let mut resolution = Resolution::default();
    let mut targets: HashMap<NodeId, NodeId> = HashMap::new();

    for id in doc.ids() {
        let Some(reference) = doc.node(id).reference() else {
            continue;
        };
        match follow(doc, id) {
            Target::Concrete(target) => {
                targets.insert(id, target);
            }
            Target::Dangling(raw) => {
                debug!(reference = %raw, "dangling reference kept as terminal node");
                resolution.dangling.push(raw);
            }
            Target::Defect(message) => {
                warn!(reference = %reference, %message, "unresolvable reference");
                resolution.defects.push(message);
            }
        }
    }

    for node in doc.nodes_mut() {
        for child in node.typed_children_mut() {
            if let Some(target) = targets.get(&*child) {
                *child = *target;
                resolution.rewritten += 1;
            }
        }
    }
    debug!(
        rewritten = resolution.rewritten,
        dangling = resolution.dangling.len(),
        "references resolved"
    );
    resolution
}

/// Sets blank `name`s of component schemas and parameters to their map key.
/// Returns the number of names filled in.
pub fn backfill_names(doc: &mut Document) -> usize {
    let Some(components) = doc.components() else {
        return 0;
    };
    let entries: Vec<(String, NodeId)> = components
        .schemas
        .iter()
        .chain(components.parameters.iter())
        .cloned()
        .collect();

    let mut filled = 0;
    for (key, id) in entries {
        let slot = match doc.node_mut(id) {
            Some(Node::Schema(schema)) => &mut schema.name,
            Some(Node::Parameter(param)) => &mut param.name,
            _ => continue,
        };
        if slot.as_deref().is_none_or(str::is_empty) {
            *slot = Some(key);
            filled += 1;
        }
    }
    filled
}
