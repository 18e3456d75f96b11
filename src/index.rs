//! Identity → location index over a [`Document`].
//!
//! The index is built once by a depth-first walk of [`Node::edges`]. A node
//! reachable along several paths keeps the pointer it was first discovered
//! under, and component definitions are anchored at their home location
//! before the walk starts.

use crate::model::{Document, Node, NodeId, entry};
use crate::pointer::Pointer;
use serde_json::Value;
use std::collections::HashMap;
use tracing::trace;

/// Vendor extension naming rule ids to suppress at a node and below.
pub const IGNORE_EXTENSION: &str = "x-oaslint-ignore";

/// Maps node identities to their recorded pointer.
#[derive(Clone, Debug, Default)]
pub struct ReverseIndex {
    pointers: Vec<Option<Pointer>>,
    ignores: HashMap<Pointer, Vec<String>>,
    indexed: usize,
}

impl ReverseIndex {
    pub fn build(doc: &Document) -> Self {
        let mut pointers: Vec<Option<Pointer>> = vec![None; doc.len()];
        let mut descended = vec![false; doc.len()];
        let mut ignores = HashMap::new();

        pointers[NodeId::ROOT.index()] = Some(Pointer::root());
        anchor_components(doc, &mut pointers);

        let mut stack = vec![(NodeId::ROOT, Pointer::root())];
        while let Some((id, discovered)) = stack.pop() {
            let Some(seen) = descended.get_mut(id.index()) else {
                continue;
            };
            if *seen {
                continue;
            }
            *seen = true;
            let base = pointers[id.index()].get_or_insert(discovered).clone();

            let node = doc.node(id);
            if let Some(rules) = ignore_directive(doc, node) {
                trace!(pointer = %base, ?rules, "ignore directive");
                ignores.entry(base.clone()).or_insert_with(Vec::new).extend(rules);
            }

            let edges = node.edges();
            for edge in edges.iter().rev() {
                if !descended[edge.target.index()] {
                    stack.push((edge.target, edge.append_to(&base)));
                }
            }
        }

        let indexed = pointers.iter().filter(|p| p.is_some()).count();
        ReverseIndex {
            pointers,
            ignores,
            indexed,
        }
    }

    /// The recorded pointer of `id`, or `None` for nodes not reachable from
    /// the root.
    pub fn pointer_for(&self, id: NodeId) -> Option<&Pointer> {
        self.pointers.get(id.index()).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.pointer_for(id).is_some()
    }

    /// Number of indexed nodes.
    pub fn len(&self) -> usize {
        self.indexed
    }

    pub fn is_empty(&self) -> bool {
        self.indexed == 0
    }

    /// Every `(node, pointer)` pair, ordered by node id.
    pub fn entries(&self) -> impl Iterator<Item = (NodeId, &Pointer)> {
        self.pointers
            .iter()
            .enumerate()
            .filter_map(|(i, p)| p.as_ref().map(|p| (NodeId(i), p)))
    }

    /// True when `pointer` or one of its ancestors carries an ignore
    /// directive naming `rule_id`.
    pub fn is_ignored(&self, pointer: &Pointer, rule_id: &str) -> bool {
        pointer.ancestors().any(|ancestor| {
            self.ignores
                .get(&ancestor)
                .is_some_and(|rules| rules.iter().any(|r| r == rule_id))
        })
    }

    pub fn ignore_directives(&self) -> &HashMap<Pointer, Vec<String>> {
        &self.ignores
    }
}

/// Component definitions get their `/components/<section>/<key>` pointer
/// before any descent, so a definition reached through another definition
/// keeps its home location.
fn anchor_components(doc: &Document, pointers: &mut [Option<Pointer>]) {
    let Some(components_id) = doc.root().components else {
        return;
    };
    let Some(components) = doc.node(components_id).as_components() else {
        return;
    };
    let base = Pointer::root().child("components");
    pointers[components_id.index()] = Some(base.clone());
    for (section, entries) in components.sections() {
        for (key, id) in entries {
            let slot = &mut pointers[id.index()];
            if slot.is_none() {
                *slot = Some(base.child(section).child(key.as_str()));
            }
        }
    }
}

/// Rule ids named by the node's ignore directive, if any.
fn ignore_directive(doc: &Document, node: &Node) -> Option<Vec<String>> {
    let directive = match node {
        Node::Object(entries) => entry(entries, IGNORE_EXTENSION)?,
        other => entry(other.extensions(), IGNORE_EXTENSION)?,
    };
    let rules = match doc.value_of(directive)? {
        Value::Array(items) => items.iter().filter_map(rule_id).collect(),
        single => rule_id(&single).into_iter().collect(),
    };
    Some(rules)
}

fn rule_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
