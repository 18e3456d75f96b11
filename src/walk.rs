//! Schema graph enumeration.
//!
//! Walkers run over a resolved document, so a `$ref` has already become a
//! shared node and a visited set is enough to stop on recursive schemas.

use crate::model::{Document, Node, NodeId, Token};
use std::collections::HashSet;

/// One schema produced by a walker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SchemaInfo {
    pub schema: NodeId,
    /// The schema (or parameter, response, ...) it was reached from.
    pub parent: Option<NodeId>,
    /// Property or map key the schema was reached through.
    pub name: Option<String>,
}

/// Depth-first schema iterator in declaration order.
///
/// Children are visited as: `items`, `allOf`, `oneOf`, `anyOf`, `not`,
/// `properties`, `additionalProperties`.
#[derive(Clone, Debug)]
pub struct SchemaWalker<'a> {
    doc: &'a Document,
    stack: Vec<SchemaInfo>,
    visited: HashSet<NodeId>,
}

impl<'a> SchemaWalker<'a> {
    fn seeded(doc: &'a Document, roots: Vec<SchemaInfo>) -> Self {
        let mut stack = roots;
        stack.reverse();
        SchemaWalker {
            doc,
            stack,
            visited: HashSet::new(),
        }
    }

    fn push_children(&mut self, id: NodeId) {
        let node = self.doc.node(id);
        let children: Vec<SchemaInfo> = node
            .edges()
            .into_iter()
            .filter(|e| !e.extension)
            .map(|e| SchemaInfo {
                schema: e.target,
                parent: Some(id),
                name: match (e.field, e.token) {
                    (Some(_), Token::Key(key)) => Some(key.to_string()),
                    _ => None,
                },
            })
            .collect();
        self.stack.extend(children.into_iter().rev());
    }
}

impl Iterator for SchemaWalker<'_> {
    type Item = SchemaInfo;

    fn next(&mut self) -> Option<SchemaInfo> {
        while let Some(info) = self.stack.pop() {
            if self.doc.schema(info.schema).is_none() || !self.visited.insert(info.schema) {
                continue;
            }
            self.push_children(info.schema);
            return Some(info);
        }
        None
    }
}

/// Every schema reachable from `start`, which is yielded first when
/// `include_self` is set. The start node never appears otherwise, even when
/// a recursive schema leads back to it.
pub fn walk_schemas(doc: &Document, start: NodeId, include_self: bool) -> SchemaWalker<'_> {
    if include_self {
        return SchemaWalker::seeded(
            doc,
            vec![SchemaInfo {
                schema: start,
                parent: None,
                name: None,
            }],
        );
    }
    let mut walker = SchemaWalker::seeded(doc, Vec::new());
    walker.visited.insert(start);
    walker.push_children(start);
    walker
}

/// Schemas hanging directly off a parameter, request body, response, header
/// or media type. A schema yields itself.
pub fn schema_roots(doc: &Document, id: NodeId) -> Vec<SchemaInfo> {
    let direct = |schema: NodeId| SchemaInfo {
        schema,
        parent: Some(id),
        name: None,
    };
    let from_content = |content: &[(String, NodeId)]| -> Vec<SchemaInfo> {
        content
            .iter()
            .filter_map(|(_, media)| doc.node(*media).as_media_type()?.schema)
            .map(|schema| SchemaInfo {
                schema,
                parent: Some(id),
                name: None,
            })
            .collect()
    };
    match doc.node(id) {
        Node::Schema(_) => vec![SchemaInfo {
            schema: id,
            parent: None,
            name: None,
        }],
        Node::Parameter(param) => param
            .schema
            .map(direct)
            .into_iter()
            .chain(from_content(&param.content[..]))
            .collect(),
        Node::RequestBody(body) => from_content(&body.content[..]),
        Node::Response(response) => response
            .headers
            .iter()
            .flat_map(|(_, header)| schema_roots(doc, *header))
            .chain(from_content(&response.content[..]))
            .collect(),
        Node::Header(header) => header.schema.map(direct).into_iter().collect(),
        Node::MediaType(media) => media.schema.map(direct).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn operation_roots(doc: &Document, op: NodeId) -> Vec<SchemaInfo> {
    let Some(operation) = doc.node(op).as_operation() else {
        return Vec::new();
    };
    operation
        .parameters
        .iter()
        .chain(operation.request_body.iter())
        .chain(operation.responses.iter().map(|(_, id)| id))
        .flat_map(|id| schema_roots(doc, *id))
        .collect()
}

/// Schemas used by one operation: parameters, request body, each response.
pub fn operation_schemas(doc: &Document, op: NodeId) -> SchemaWalker<'_> {
    SchemaWalker::seeded(doc, operation_roots(doc, op))
}

/// Every schema of the document: component definitions first, then the
/// schemas reachable from paths. Each identity is produced once.
pub fn all_schemas(doc: &Document) -> SchemaWalker<'_> {
    let mut roots = Vec::new();
    if let Some(components) = doc.components() {
        roots.extend(components.schemas.iter().map(|(name, id)| SchemaInfo {
            schema: *id,
            parent: None,
            name: Some(name.clone()),
        }));
        for (_, id) in components
            .parameters
            .iter()
            .chain(&components.responses)
            .chain(&components.request_bodies)
            .chain(&components.headers)
        {
            roots.extend(schema_roots(doc, *id));
        }
    }
    roots.extend(path_roots(doc));
    SchemaWalker::seeded(doc, roots)
}

/// Schemas reachable from `paths` only.
pub fn path_schemas(doc: &Document) -> SchemaWalker<'_> {
    SchemaWalker::seeded(doc, path_roots(doc))
}

fn path_roots(doc: &Document) -> Vec<SchemaInfo> {
    let mut roots = Vec::new();
    for (_, item_id) in &doc.root().paths {
        let Some(item) = doc.node(*item_id).as_path_item() else {
            continue;
        };
        for param in &item.parameters {
            roots.extend(schema_roots(doc, *param));
        }
        for (_, op) in &item.operations {
            roots.extend(operation_roots(doc, *op));
        }
    }
    roots
}

/// A header definition: an `in: header` parameter or a response header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HeaderElement {
    pub name: String,
    pub node: NodeId,
}

fn header_parameter(doc: &Document, id: NodeId) -> Option<HeaderElement> {
    let param = doc.node(id).as_parameter()?;
    (param.location.as_deref() == Some("header")).then(|| HeaderElement {
        name: param.name.clone().unwrap_or_default(),
        node: id,
    })
}

/// Every header definition: component header parameters, then per path item
/// its header parameters, and per operation its header parameters followed
/// by its response headers.
pub fn all_headers(doc: &Document) -> Vec<HeaderElement> {
    let mut out = Vec::new();
    if let Some(components) = doc.components() {
        out.extend(
            components
                .parameters
                .iter()
                .filter_map(|(_, id)| header_parameter(doc, *id)),
        );
    }
    for (_, item_id) in &doc.root().paths {
        let Some(item) = doc.node(*item_id).as_path_item() else {
            continue;
        };
        out.extend(
            item.parameters
                .iter()
                .filter_map(|id| header_parameter(doc, *id)),
        );
        for (_, op_id) in &item.operations {
            let Some(op) = doc.node(*op_id).as_operation() else {
                continue;
            };
            out.extend(
                op.parameters
                    .iter()
                    .filter_map(|id| header_parameter(doc, *id)),
            );
            for (_, response) in &op.responses {
                let Some(response) = doc.node(*response).as_response() else {
                    continue;
                };
                out.extend(response.headers.iter().map(|(name, id)| HeaderElement {
                    name: name.clone(),
                    node: *id,
                }));
            }
        }
    }
    out
}
