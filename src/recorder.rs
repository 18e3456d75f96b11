//! Access recording.
//!
//! Rules walk the document through [`Tracked`] handles. Every navigation step
//! (and every read of a node's payload through [`Tracked::node`]) stores the
//! pointer of the touched node in the shared [`Recorder`], so a rule can build
//! a violation without threading a location through its pipeline. Extension
//! accessors never record: vendor extensions are metadata, not the subject
//! being checked.
//!
//! Only the single most recent access is kept. A rule that touches several
//! unrelated nodes before reporting should pass an explicit location.

use crate::model::{Document, Method, Node, NodeId, Token};
use crate::pointer::Pointer;
use serde_json::Value;
use std::cell::RefCell;
use tracing::trace;

/// The most recent pointer observed through a tracked handle.
#[derive(Debug, Default)]
pub struct Recorder {
    last: RefCell<Pointer>,
}

impl Recorder {
    pub fn new() -> Self {
        Recorder::default()
    }

    /// Starts a fresh scope at the document root.
    pub fn reset(&self) {
        *self.last.borrow_mut() = Pointer::root();
    }

    pub fn record(&self, pointer: &Pointer) {
        trace!(pointer = %pointer, "access");
        *self.last.borrow_mut() = pointer.clone();
    }

    pub fn pointer(&self) -> Pointer {
        self.last.borrow().clone()
    }
}

/// A node handle that reports each traversal step to a [`Recorder`].
#[derive(Clone, Debug)]
pub struct Tracked<'a> {
    doc: &'a Document,
    recorder: &'a Recorder,
    id: NodeId,
    pointer: Pointer,
}

impl<'a> Tracked<'a> {
    /// A handle on the document root. Resets the recorder's scope.
    pub fn root(doc: &'a Document, recorder: &'a Recorder) -> Self {
        recorder.reset();
        Tracked {
            doc,
            recorder,
            id: NodeId::ROOT,
            pointer: Pointer::root(),
        }
    }

    /// A handle on an arbitrary node reached through `pointer`. Does not
    /// touch the recorder until used.
    pub(crate) fn at(
        doc: &'a Document,
        recorder: &'a Recorder,
        id: NodeId,
        pointer: Pointer,
    ) -> Self {
        Tracked {
            doc,
            recorder,
            id,
            pointer,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The pointer this handle was reached through.
    pub fn pointer(&self) -> &Pointer {
        &self.pointer
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Records this node as the current location.
    pub fn touch(&self) {
        self.recorder.record(&self.pointer);
    }

    /// The node payload. Reading it counts as touching the node.
    pub fn node(&self) -> &'a Node {
        self.touch();
        self.doc.node(self.id)
    }

    fn descend(&self, id: NodeId, pointer: Pointer) -> Tracked<'a> {
        Tracked {
            doc: self.doc,
            recorder: self.recorder,
            id,
            pointer,
        }
    }

    /// A direct child such as `info`, `schema` or `requestBody`.
    pub fn field(&self, name: &str) -> Option<Tracked<'a>> {
        let edge = self
            .doc
            .node(self.id)
            .edges()
            .into_iter()
            .find(|e| !e.extension && e.field.is_none() && e.token == Token::Key(name))?;
        let child = self.descend(edge.target, edge.append_to(&self.pointer));
        child.touch();
        Some(child)
    }

    /// Elements of a sequence field such as `servers` or `allOf`. Records
    /// the sequence itself; elements record when used.
    pub fn list(&self, field: &str) -> Vec<Tracked<'a>> {
        self.recorder.record(&self.pointer.child(field));
        self.doc
            .node(self.id)
            .edges()
            .into_iter()
            .filter(|e| e.field == Some(field))
            .map(|e| self.descend(e.target, e.append_to(&self.pointer)))
            .collect()
    }

    /// Entries of a map field such as `paths` or `properties`. Records the
    /// map itself; entries record when used.
    pub fn map(&self, field: &str) -> Vec<(&'a str, Tracked<'a>)> {
        self.recorder.record(&self.pointer.child(field));
        self.doc
            .node(self.id)
            .edges()
            .into_iter()
            .filter(|e| e.field == Some(field))
            .filter_map(|e| match e.token {
                Token::Key(key) => Some((key, self.descend(e.target, e.append_to(&self.pointer)))),
                Token::Index(_) => None,
            })
            .collect()
    }

    /// A child addressed by one raw pointer token; works on untyped nodes.
    pub fn child(&self, token: &str) -> Option<Tracked<'a>> {
        let tokens = [token.to_string()];
        let edge = self
            .doc
            .node(self.id)
            .edges()
            .into_iter()
            .find(|e| !e.extension && e.match_tokens(&tokens) == Some(1))?;
        let child = self.descend(edge.target, edge.append_to(&self.pointer));
        child.touch();
        Some(child)
    }

    // ─── Typed navigation ───────────────────────────────────────────────────

    pub fn info(&self) -> Option<Tracked<'a>> {
        self.field("info")
    }

    pub fn servers(&self) -> Vec<Tracked<'a>> {
        self.list("servers")
    }

    pub fn tags(&self) -> Vec<Tracked<'a>> {
        self.list("tags")
    }

    pub fn components(&self) -> Option<Tracked<'a>> {
        self.field("components")
    }

    pub fn paths(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("paths")
    }

    /// Operations of a path item, in method order.
    pub fn operations(&self) -> Vec<(Method, Tracked<'a>)> {
        let Some(item) = self.node().as_path_item() else {
            return Vec::new();
        };
        item.operations
            .iter()
            .map(|(method, id)| (*method, self.descend(*id, self.pointer.child(method.as_str()))))
            .collect()
    }

    pub fn parameters(&self) -> Vec<Tracked<'a>> {
        self.list("parameters")
    }

    pub fn request_body(&self) -> Option<Tracked<'a>> {
        self.field("requestBody")
    }

    pub fn responses(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("responses")
    }

    pub fn content(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("content")
    }

    pub fn headers(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("headers")
    }

    pub fn schema(&self) -> Option<Tracked<'a>> {
        self.field("schema")
    }

    pub fn properties(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("properties")
    }

    pub fn items(&self) -> Option<Tracked<'a>> {
        self.field("items")
    }

    pub fn all_of(&self) -> Vec<Tracked<'a>> {
        self.list("allOf")
    }

    pub fn one_of(&self) -> Vec<Tracked<'a>> {
        self.list("oneOf")
    }

    pub fn any_of(&self) -> Vec<Tracked<'a>> {
        self.list("anyOf")
    }

    pub fn not(&self) -> Option<Tracked<'a>> {
        self.field("not")
    }

    /// The typed `additionalProperties` schema, or the named entries of the
    /// map-shaped form.
    pub fn additional_properties(&self) -> Vec<(Option<&'a str>, Tracked<'a>)> {
        if let Some(typed) = self.field("additionalProperties") {
            return vec![(None, typed)];
        }
        self.map("additionalProperties")
            .into_iter()
            .map(|(key, t)| (Some(key), t))
            .collect()
    }

    pub fn schemas(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("schemas")
    }

    pub fn component_parameters(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("parameters")
    }

    pub fn component_responses(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("responses")
    }

    pub fn component_request_bodies(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("requestBodies")
    }

    pub fn component_headers(&self) -> Vec<(&'a str, Tracked<'a>)> {
        self.map("headers")
    }

    // ─── Extensions (not recorded) ──────────────────────────────────────────

    /// Names and values of this node's vendor extensions.
    pub fn extensions(&self) -> Vec<(&'a str, Value)> {
        self.doc
            .node(self.id)
            .extensions()
            .iter()
            .filter_map(|(name, id)| Some((name.as_str(), self.doc.value_of(*id)?)))
            .collect()
    }

    pub fn extension(&self, name: &str) -> Option<Value> {
        self.doc.extension(self.id, name)
    }
}
