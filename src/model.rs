//! The canonical document tree.
//!
//! A [`Document`] is an arena of [`Node`]s. Every node is addressed by a
//! [`NodeId`] assigned when the node is created, and that id is the node's
//! identity: two structurally equal schemas at different locations are two
//! different ids, while a resolved `$ref` makes several parents share one id.
//!
//! Child relations are listed by [`Node::edges`], the single traversal table
//! used by the reverse index, the access recorder and pointer resolution.

use crate::pointer::Pointer;
use serde::Serialize;
use serde_json::Value;

/// Stable identity of a node inside one [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The document root.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

/// Ordered `(key, child)` pairs. Keys keep document order.
pub type Entries = Vec<(String, NodeId)>;

/// Looks up `key` in an ordered entry list.
pub fn entry(entries: &[(String, NodeId)], key: &str) -> Option<NodeId> {
    entries
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, id)| *id)
}

/// HTTP methods that may carry an operation, in traversal order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
    Trace,
}

impl Method {
    pub const ALL: [Method; 8] = [
        Method::Get,
        Method::Put,
        Method::Post,
        Method::Delete,
        Method::Options,
        Method::Head,
        Method::Patch,
        Method::Trace,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "get",
            Method::Put => "put",
            Method::Post => "post",
            Method::Delete => "delete",
            Method::Options => "options",
            Method::Head => "head",
            Method::Patch => "patch",
            Method::Trace => "trace",
        }
    }

    pub fn from_key(key: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.as_str() == key)
    }
}

// ─── Node payloads ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct Root {
    pub openapi: String,
    pub info: Option<NodeId>,
    pub servers: Vec<NodeId>,
    pub tags: Vec<NodeId>,
    pub components: Option<NodeId>,
    pub paths: Entries,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Info {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Server {
    pub url: String,
    pub description: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct PathItem {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub operations: Vec<(Method, NodeId)>,
    pub parameters: Vec<NodeId>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub deprecated: bool,
    pub parameters: Vec<NodeId>,
    pub request_body: Option<NodeId>,
    pub responses: Entries,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Parameter {
    pub name: Option<String>,
    /// The `in` field.
    pub location: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub deprecated: bool,
    pub schema: Option<NodeId>,
    pub content: Entries,
    pub reference: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct RequestBody {
    pub description: Option<String>,
    pub required: bool,
    pub content: Entries,
    pub reference: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Response {
    pub description: Option<String>,
    pub headers: Entries,
    pub content: Entries,
    pub reference: Option<String>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct MediaType {
    pub schema: Option<NodeId>,
    pub extensions: Entries,
}

#[derive(Clone, Debug, Default)]
pub struct Header {
    pub description: Option<String>,
    pub required: bool,
    pub schema: Option<NodeId>,
    pub reference: Option<String>,
    pub extensions: Entries,
}

/// `additionalProperties` is a boolean, a schema, or (in loosely written
/// documents) a map of named schemas.
#[derive(Clone, Debug)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(NodeId),
    Named(Entries),
}

#[derive(Clone, Debug, Default)]
pub struct Schema {
    /// Internal name; back-filled from the component key when blank.
    pub name: Option<String>,
    pub reference: Option<String>,
    pub schema_type: Option<String>,
    pub format: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub enumeration: Option<Vec<Value>>,
    pub default: Option<Value>,
    pub example: Option<Value>,
    pub pattern: Option<String>,
    pub nullable: bool,
    pub read_only: bool,
    pub required: Vec<String>,
    pub properties: Entries,
    pub items: Option<NodeId>,
    pub all_of: Vec<NodeId>,
    pub one_of: Vec<NodeId>,
    pub any_of: Vec<NodeId>,
    pub not: Option<NodeId>,
    pub additional_properties: Option<AdditionalProperties>,
    pub extensions: Entries,
}

impl Schema {
    /// A non-empty `enum` list.
    pub fn is_enum(&self) -> bool {
        self.enumeration.as_ref().is_some_and(|e| !e.is_empty())
    }
}

#[derive(Clone, Debug, Default)]
pub struct Components {
    pub schemas: Entries,
    pub responses: Entries,
    pub parameters: Entries,
    pub request_bodies: Entries,
    pub headers: Entries,
    pub extensions: Entries,
}

impl Components {
    /// Every definition section with its pointer token.
    pub fn sections(&self) -> [(&'static str, &Entries); 5] {
        [
            ("schemas", &self.schemas),
            ("responses", &self.responses),
            ("parameters", &self.parameters),
            ("requestBodies", &self.request_bodies),
            ("headers", &self.headers),
        ]
    }
}

/// Any object reachable from a document root.
#[derive(Clone, Debug)]
pub enum Node {
    Root(Root),
    Info(Info),
    Server(Server),
    Tag(Tag),
    PathItem(PathItem),
    Operation(Operation),
    Parameter(Parameter),
    RequestBody(RequestBody),
    Response(Response),
    MediaType(MediaType),
    Header(Header),
    Schema(Schema),
    Components(Components),
    /// Untyped mapping (vendor extensions, legacy side tree).
    Object(Entries),
    /// Untyped sequence.
    Array(Vec<NodeId>),
    /// Untyped leaf value.
    Scalar(Value),
}

/// One pointer token of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Token<'a> {
    Key(&'a str),
    Index(usize),
}

impl Token<'_> {
    fn matches(&self, raw: &str) -> bool {
        match self {
            Token::Key(key) => *key == raw,
            // RFC 6901 indices carry no sign and no leading zeros.
            Token::Index(i) => raw == i.to_string(),
        }
    }

    fn push_onto(&self, pointer: &Pointer) -> Pointer {
        match self {
            Token::Key(key) => pointer.child(*key),
            Token::Index(i) => pointer.index(*i),
        }
    }
}

/// A parent → child relation: an optional container field (`paths`,
/// `servers`, ...) followed by the key or index of the child.
#[derive(Clone, Copy, Debug)]
pub struct Edge<'a> {
    pub field: Option<&'a str>,
    pub token: Token<'a>,
    pub target: NodeId,
    pub extension: bool,
}

impl<'a> Edge<'a> {
    fn field(name: &'static str, target: NodeId) -> Self {
        Edge {
            field: None,
            token: Token::Key(name),
            target,
            extension: false,
        }
    }

    fn keyed(field: &'static str, key: &'a str, target: NodeId) -> Self {
        Edge {
            field: Some(field),
            token: Token::Key(key),
            target,
            extension: false,
        }
    }

    fn indexed(field: &'static str, index: usize, target: NodeId) -> Self {
        Edge {
            field: Some(field),
            token: Token::Index(index),
            target,
            extension: false,
        }
    }

    /// The pointer of the child given the pointer of the parent.
    pub fn append_to(&self, parent: &Pointer) -> Pointer {
        let base = match self.field {
            Some(field) => parent.child(field),
            None => parent.clone(),
        };
        self.token.push_onto(&base)
    }

    /// Number of leading tokens of `tokens` consumed by this edge, if it matches.
    pub fn match_tokens(&self, tokens: &[String]) -> Option<usize> {
        match self.field {
            Some(field) => {
                let [first, second, ..] = tokens else {
                    return None;
                };
                (first == field && self.token.matches(second)).then_some(2)
            }
            None => {
                let first = tokens.first()?;
                self.token.matches(first).then_some(1)
            }
        }
    }
}

fn push_list<'a>(edges: &mut Vec<Edge<'a>>, field: &'static str, ids: &[NodeId]) {
    edges.extend(
        ids.iter()
            .enumerate()
            .map(|(i, id)| Edge::indexed(field, i, *id)),
    );
}

fn push_map<'a>(edges: &mut Vec<Edge<'a>>, field: &'static str, entries: &'a Entries) {
    edges.extend(
        entries
            .iter()
            .map(|(key, id)| Edge::keyed(field, key.as_str(), *id)),
    );
}

fn push_extensions<'a>(edges: &mut Vec<Edge<'a>>, entries: &'a Entries) {
    edges.extend(entries.iter().map(|(key, id)| Edge {
        field: None,
        token: Token::Key(key.as_str()),
        target: *id,
        extension: true,
    }));
}

fn push_opt<'a>(edges: &mut Vec<Edge<'a>>, name: &'static str, id: Option<NodeId>) {
    if let Some(id) = id {
        edges.push(Edge::field(name, id));
    }
}

impl Node {
    /// Child relations in declared order; vendor extensions come last.
    pub fn edges(&self) -> Vec<Edge<'_>> {
        let mut edges = Vec::new();
        match self {
            Node::Root(root) => {
                push_opt(&mut edges, "info", root.info);
                push_list(&mut edges, "servers", &root.servers);
                push_list(&mut edges, "tags", &root.tags);
                push_opt(&mut edges, "components", root.components);
                push_map(&mut edges, "paths", &root.paths);
            }
            Node::PathItem(item) => {
                edges.extend(
                    item.operations
                        .iter()
                        .map(|(method, id)| Edge::field(method.as_str(), *id)),
                );
                push_list(&mut edges, "parameters", &item.parameters);
            }
            Node::Operation(op) => {
                push_list(&mut edges, "parameters", &op.parameters);
                push_opt(&mut edges, "requestBody", op.request_body);
                push_map(&mut edges, "responses", &op.responses);
            }
            Node::Parameter(param) => {
                push_opt(&mut edges, "schema", param.schema);
                push_map(&mut edges, "content", &param.content);
            }
            Node::RequestBody(body) => push_map(&mut edges, "content", &body.content),
            Node::Response(response) => {
                push_map(&mut edges, "headers", &response.headers);
                push_map(&mut edges, "content", &response.content);
            }
            Node::MediaType(media) => push_opt(&mut edges, "schema", media.schema),
            Node::Header(header) => push_opt(&mut edges, "schema", header.schema),
            Node::Schema(schema) => {
                push_opt(&mut edges, "items", schema.items);
                push_list(&mut edges, "allOf", &schema.all_of);
                push_list(&mut edges, "oneOf", &schema.one_of);
                push_list(&mut edges, "anyOf", &schema.any_of);
                push_opt(&mut edges, "not", schema.not);
                push_map(&mut edges, "properties", &schema.properties);
                match &schema.additional_properties {
                    Some(AdditionalProperties::Schema(id)) => {
                        edges.push(Edge::field("additionalProperties", *id));
                    }
                    Some(AdditionalProperties::Named(entries)) => {
                        push_map(&mut edges, "additionalProperties", entries);
                    }
                    Some(AdditionalProperties::Allowed(_)) | None => {}
                }
            }
            Node::Components(components) => {
                for (section, entries) in components.sections() {
                    push_map(&mut edges, section, entries);
                }
            }
            Node::Object(entries) => {
                edges.extend(entries.iter().map(|(key, id)| Edge {
                    field: None,
                    token: Token::Key(key.as_str()),
                    target: *id,
                    extension: false,
                }));
            }
            Node::Array(items) => {
                edges.extend(items.iter().enumerate().map(|(i, id)| Edge {
                    field: None,
                    token: Token::Index(i),
                    target: *id,
                    extension: false,
                }));
            }
            Node::Info(_) | Node::Server(_) | Node::Tag(_) | Node::Scalar(_) => {}
        }
        push_extensions(&mut edges, self.extensions());
        edges
    }

    /// Mutable references to every typed child id, for reference rewriting.
    /// Component definitions and untyped children are not included.
    pub(crate) fn typed_children_mut(&mut self) -> Vec<&mut NodeId> {
        let mut out: Vec<&mut NodeId> = Vec::new();
        match self {
            Node::Root(root) => {
                out.extend(root.paths.iter_mut().map(|(_, id)| id));
            }
            Node::PathItem(item) => {
                out.extend(item.operations.iter_mut().map(|(_, id)| id));
                out.extend(item.parameters.iter_mut());
            }
            Node::Operation(op) => {
                out.extend(op.parameters.iter_mut());
                out.extend(op.request_body.iter_mut());
                out.extend(op.responses.iter_mut().map(|(_, id)| id));
            }
            Node::Parameter(param) => {
                out.extend(param.schema.iter_mut());
                out.extend(param.content.iter_mut().map(|(_, id)| id));
            }
            Node::RequestBody(body) => out.extend(body.content.iter_mut().map(|(_, id)| id)),
            Node::Response(response) => {
                out.extend(response.headers.iter_mut().map(|(_, id)| id));
                out.extend(response.content.iter_mut().map(|(_, id)| id));
            }
            Node::MediaType(media) => out.extend(media.schema.iter_mut()),
            Node::Header(header) => out.extend(header.schema.iter_mut()),
            Node::Schema(schema) => {
                out.extend(schema.items.iter_mut());
                out.extend(schema.all_of.iter_mut());
                out.extend(schema.one_of.iter_mut());
                out.extend(schema.any_of.iter_mut());
                out.extend(schema.not.iter_mut());
                out.extend(schema.properties.iter_mut().map(|(_, id)| id));
                match &mut schema.additional_properties {
                    Some(AdditionalProperties::Schema(id)) => out.push(id),
                    Some(AdditionalProperties::Named(entries)) => {
                        out.extend(entries.iter_mut().map(|(_, id)| id));
                    }
                    Some(AdditionalProperties::Allowed(_)) | None => {}
                }
            }
            Node::Info(_)
            | Node::Server(_)
            | Node::Tag(_)
            | Node::Components(_)
            | Node::Object(_)
            | Node::Array(_)
            | Node::Scalar(_) => {}
        }
        out
    }

    /// Vendor extension entries (`x-*`) of typed nodes.
    pub fn extensions(&self) -> &Entries {
        static NONE: Entries = Vec::new();
        match self {
            Node::Root(n) => &n.extensions,
            Node::Info(n) => &n.extensions,
            Node::Server(n) => &n.extensions,
            Node::Tag(n) => &n.extensions,
            Node::PathItem(n) => &n.extensions,
            Node::Operation(n) => &n.extensions,
            Node::Parameter(n) => &n.extensions,
            Node::RequestBody(n) => &n.extensions,
            Node::Response(n) => &n.extensions,
            Node::MediaType(n) => &n.extensions,
            Node::Header(n) => &n.extensions,
            Node::Schema(n) => &n.extensions,
            Node::Components(n) => &n.extensions,
            Node::Object(_) | Node::Array(_) | Node::Scalar(_) => &NONE,
        }
    }

    /// The `$ref` of a reference marker node.
    pub fn reference(&self) -> Option<&str> {
        match self {
            Node::Parameter(n) => n.reference.as_deref(),
            Node::RequestBody(n) => n.reference.as_deref(),
            Node::Response(n) => n.reference.as_deref(),
            Node::Header(n) => n.reference.as_deref(),
            Node::Schema(n) => n.reference.as_deref(),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Node::Root(_) => "root",
            Node::Info(_) => "info",
            Node::Server(_) => "server",
            Node::Tag(_) => "tag",
            Node::PathItem(_) => "path item",
            Node::Operation(_) => "operation",
            Node::Parameter(_) => "parameter",
            Node::RequestBody(_) => "request body",
            Node::Response(_) => "response",
            Node::MediaType(_) => "media type",
            Node::Header(_) => "header",
            Node::Schema(_) => "schema",
            Node::Components(_) => "components",
            Node::Object(_) => "object",
            Node::Array(_) => "array",
            Node::Scalar(_) => "scalar",
        }
    }
}

macro_rules! node_accessors {
    ($($name:ident => $variant:ident($ty:ty)),* $(,)?) => {
        impl Node {
            $(
                pub fn $name(&self) -> Option<&$ty> {
                    match self {
                        Node::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            )*
        }
    };
}

node_accessors! {
    as_root => Root(Root),
    as_info => Info(Info),
    as_server => Server(Server),
    as_tag => Tag(Tag),
    as_path_item => PathItem(PathItem),
    as_operation => Operation(Operation),
    as_parameter => Parameter(Parameter),
    as_request_body => RequestBody(RequestBody),
    as_response => Response(Response),
    as_media_type => MediaType(MediaType),
    as_header => Header(Header),
    as_schema => Schema(Schema),
    as_components => Components(Components),
}

// ─── Document ───────────────────────────────────────────────────────────────

static EMPTY_ROOT: Root = Root {
    openapi: String::new(),
    info: None,
    servers: Vec::new(),
    tags: Vec::new(),
    components: None,
    paths: Vec::new(),
    extensions: Vec::new(),
};

/// An arena-backed document tree whose root is [`NodeId::ROOT`].
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Default for Document {
    fn default() -> Self {
        Document::new(Node::Root(Root {
            openapi: "3.0.0".to_string(),
            ..Root::default()
        }))
    }
}

impl Document {
    /// Creates a document holding only `root`.
    pub fn new(root: Node) -> Self {
        Document { nodes: vec![root] }
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    /// Reserves an id to be filled by [`Document::set`] once children exist.
    pub(crate) fn reserve(&mut self) -> NodeId {
        self.push(Node::Scalar(Value::Null))
    }

    pub(crate) fn set(&mut self, id: NodeId, node: Node) {
        self.nodes[id.0] = node;
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.iter_mut()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// The node behind `id`. Ids only come from this document, so a miss
    /// yields an empty scalar rather than a panic.
    pub fn node(&self, id: NodeId) -> &Node {
        static MISSING: Node = Node::Scalar(Value::Null);
        self.nodes.get(id.0).unwrap_or(&MISSING)
    }

    /// The typed root. Untyped documents (the legacy side tree) yield an
    /// empty root.
    pub fn root(&self) -> &Root {
        self.nodes
            .first()
            .and_then(Node::as_root)
            .unwrap_or(&EMPTY_ROOT)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn components(&self) -> Option<&Components> {
        self.root()
            .components
            .and_then(|id| self.node(id).as_components())
    }

    pub fn schema(&self, id: NodeId) -> Option<&Schema> {
        self.node(id).as_schema()
    }

    /// The component schema registered under `name`.
    pub fn component_schema(&self, name: &str) -> Option<NodeId> {
        self.components().and_then(|c| entry(&c.schemas, name))
    }

    /// Operations of every path item, in document order.
    pub fn operations(&self) -> Vec<(&str, Method, NodeId)> {
        self.root()
            .paths
            .iter()
            .filter_map(|(path, id)| Some((path.as_str(), self.node(*id).as_path_item()?)))
            .flat_map(|(path, item)| {
                item.operations
                    .iter()
                    .map(move |(method, id)| (path, *method, *id))
            })
            .collect()
    }

    /// Follows `pointer` from the root along the traversal table.
    pub fn resolve(&self, pointer: &Pointer) -> Option<NodeId> {
        let mut current = NodeId::ROOT;
        let mut rest = pointer.tokens();
        while !rest.is_empty() {
            let (target, consumed) = self
                .node(current)
                .edges()
                .iter()
                .find_map(|edge| edge.match_tokens(rest).map(|n| (edge.target, n)))?;
            current = target;
            rest = &rest[consumed..];
        }
        Some(current)
    }

    /// Rebuilds a JSON value from an untyped subtree (extension values and
    /// the legacy side tree). Typed nodes yield `None`.
    pub fn value_of(&self, id: NodeId) -> Option<Value> {
        match self.node(id) {
            Node::Scalar(value) => Some(value.clone()),
            Node::Array(items) => items
                .iter()
                .map(|item| self.value_of(*item))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array),
            Node::Object(entries) => entries
                .iter()
                .map(|(key, item)| Some((key.clone(), self.value_of(*item)?)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(Value::Object),
            _ => None,
        }
    }

    /// The value of extension `name` on node `id`.
    pub fn extension(&self, id: NodeId, name: &str) -> Option<Value> {
        entry(self.node(id).extensions(), name).and_then(|ext| self.value_of(ext))
    }
}
