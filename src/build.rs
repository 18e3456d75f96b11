//! Builds the typed [`Document`] arena from a parsed OpenAPI v3 value.
//!
//! The mapping is lenient: fields of an unexpected shape are skipped (and
//! logged at `debug`) instead of failing the document, since a linter has to
//! report on documents that are structurally odd.

use crate::model::*;
use serde_json::{Map, Value};
use tracing::debug;

/// Keywords that mark an object as a schema rather than a map of schemas.
const SCHEMA_KEYWORDS: &[&str] = &[
    "$ref",
    "type",
    "format",
    "title",
    "description",
    "enum",
    "default",
    "example",
    "pattern",
    "nullable",
    "readOnly",
    "writeOnly",
    "required",
    "properties",
    "items",
    "allOf",
    "oneOf",
    "anyOf",
    "not",
    "additionalProperties",
    "minimum",
    "maximum",
    "minLength",
    "maxLength",
    "minItems",
    "maxItems",
    "discriminator",
];

/// Builds the canonical tree for an OpenAPI v3 document value.
pub fn build(value: &Value) -> Document {
    let mut builder = Builder {
        doc: Document::new(Node::Scalar(Value::Null)),
    };
    let root = builder.root(value);
    builder.doc.set(NodeId::ROOT, root);
    builder.doc
}

/// Builds an untyped tree mirroring `value`; used for the legacy side tree.
pub fn build_untyped(value: &Value) -> Document {
    let mut builder = Builder {
        doc: Document::new(Node::Scalar(Value::Null)),
    };
    let root = builder.untyped_node(value);
    builder.doc.set(NodeId::ROOT, root);
    builder.doc
}

struct Builder {
    doc: Document,
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

fn flag(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn object<'v>(obj: &'v Map<String, Value>, key: &str) -> Option<&'v Map<String, Value>> {
    let value = obj.get(key)?;
    let found = value.as_object();
    if found.is_none() {
        debug!(field = key, "expected a mapping, skipping");
    }
    found
}

fn array<'v>(obj: &'v Map<String, Value>, key: &str) -> &'v [Value] {
    match obj.get(key) {
        Some(Value::Array(items)) => items,
        Some(_) => {
            debug!(field = key, "expected a sequence, skipping");
            &[]
        }
        None => &[],
    }
}

impl Builder {
    fn root(&mut self, value: &Value) -> Node {
        let empty = Map::new();
        let obj = value.as_object().unwrap_or(&empty);
        Node::Root(Root {
            openapi: string(obj, "openapi").unwrap_or_default(),
            info: object(obj, "info").map(|info| self.info(info)),
            servers: array(obj, "servers")
                .iter()
                .filter_map(Value::as_object)
                .map(|server| self.server(server))
                .collect(),
            tags: array(obj, "tags")
                .iter()
                .filter_map(Value::as_object)
                .map(|tag| self.tag(tag))
                .collect(),
            components: object(obj, "components").map(|c| self.components(c)),
            paths: self.patterned_map_of(obj, "paths", Builder::path_item),
            extensions: self.extensions(obj),
        })
    }

    /// Builds every object-valued entry of `obj[key]` with `build_one`.
    fn map_of(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        build_one: fn(&mut Builder, &Map<String, Value>) -> NodeId,
    ) -> Entries {
        self.entries_of(obj, key, build_one, |_| true)
    }

    /// Like [`Builder::map_of`] for maps that also carry `x-` extensions
    /// (`paths`, `responses`). Extension keys are skipped.
    fn patterned_map_of(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        build_one: fn(&mut Builder, &Map<String, Value>) -> NodeId,
    ) -> Entries {
        self.entries_of(obj, key, build_one, |name| !name.starts_with("x-"))
    }

    fn entries_of(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        build_one: fn(&mut Builder, &Map<String, Value>) -> NodeId,
        keep: fn(&str) -> bool,
    ) -> Entries {
        let Some(map) = object(obj, key) else {
            return Vec::new();
        };
        map.iter()
            .filter(|(name, _)| keep(name))
            .filter_map(|(name, v)| Some((name.clone(), v.as_object()?)))
            .map(|(name, v)| (name, build_one(self, v)))
            .collect()
    }

    fn extensions(&mut self, obj: &Map<String, Value>) -> Entries {
        obj.iter()
            .filter(|(key, _)| key.starts_with("x-"))
            .map(|(key, value)| (key.clone(), self.untyped(value)))
            .collect()
    }

    fn info(&mut self, obj: &Map<String, Value>) -> NodeId {
        let node = Node::Info(Info {
            title: string(obj, "title"),
            version: string(obj, "version"),
            description: string(obj, "description"),
            extensions: self.extensions(obj),
        });
        self.doc.push(node)
    }

    fn server(&mut self, obj: &Map<String, Value>) -> NodeId {
        let node = Node::Server(Server {
            url: string(obj, "url").unwrap_or_default(),
            description: string(obj, "description"),
            extensions: self.extensions(obj),
        });
        self.doc.push(node)
    }

    fn tag(&mut self, obj: &Map<String, Value>) -> NodeId {
        let node = Node::Tag(Tag {
            name: string(obj, "name").unwrap_or_default(),
            description: string(obj, "description"),
            extensions: self.extensions(obj),
        });
        self.doc.push(node)
    }

    fn components(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::Components(Components {
            schemas: self.map_of(obj, "schemas", Builder::schema),
            responses: self.map_of(obj, "responses", Builder::response),
            parameters: self.map_of(obj, "parameters", Builder::parameter),
            request_bodies: self.map_of(obj, "requestBodies", Builder::request_body),
            headers: self.map_of(obj, "headers", Builder::header),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn path_item(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let operations = Method::ALL
            .into_iter()
            .filter_map(|method| Some((method, object(obj, method.as_str())?)))
            .map(|(method, op)| (method, self.operation(op)))
            .collect();
        let node = Node::PathItem(PathItem {
            summary: string(obj, "summary"),
            description: string(obj, "description"),
            operations,
            parameters: self.list_of(obj, "parameters", Builder::parameter),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn list_of(
        &mut self,
        obj: &Map<String, Value>,
        key: &str,
        build_one: fn(&mut Builder, &Map<String, Value>) -> NodeId,
    ) -> Vec<NodeId> {
        array(obj, key)
            .iter()
            .filter_map(Value::as_object)
            .map(|item| build_one(self, item))
            .collect()
    }

    fn operation(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::Operation(Operation {
            operation_id: string(obj, "operationId"),
            summary: string(obj, "summary"),
            description: string(obj, "description"),
            tags: array(obj, "tags")
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            deprecated: flag(obj, "deprecated"),
            parameters: self.list_of(obj, "parameters", Builder::parameter),
            request_body: object(obj, "requestBody").map(|body| self.request_body(body)),
            responses: self.patterned_map_of(obj, "responses", Builder::response),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn parameter(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::Parameter(Parameter {
            name: string(obj, "name"),
            location: string(obj, "in"),
            description: string(obj, "description"),
            required: flag(obj, "required"),
            deprecated: flag(obj, "deprecated"),
            schema: object(obj, "schema").map(|s| self.schema(s)),
            content: self.map_of(obj, "content", Builder::media_type),
            reference: string(obj, "$ref"),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn request_body(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::RequestBody(RequestBody {
            description: string(obj, "description"),
            required: flag(obj, "required"),
            content: self.map_of(obj, "content", Builder::media_type),
            reference: string(obj, "$ref"),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn response(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::Response(Response {
            description: string(obj, "description"),
            headers: self.map_of(obj, "headers", Builder::header),
            content: self.map_of(obj, "content", Builder::media_type),
            reference: string(obj, "$ref"),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn media_type(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::MediaType(MediaType {
            schema: object(obj, "schema").map(|s| self.schema(s)),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn header(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let node = Node::Header(Header {
            description: string(obj, "description"),
            required: flag(obj, "required"),
            schema: object(obj, "schema").map(|s| self.schema(s)),
            reference: string(obj, "$ref"),
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn schema(&mut self, obj: &Map<String, Value>) -> NodeId {
        let id = self.doc.reserve();
        let additional_properties = obj.get("additionalProperties").and_then(|v| match v {
            Value::Bool(allowed) => Some(AdditionalProperties::Allowed(*allowed)),
            Value::Object(inner) if is_named_schema_map(inner) => {
                Some(AdditionalProperties::Named(
                    inner
                        .iter()
                        .filter_map(|(name, s)| Some((name.clone(), s.as_object()?)))
                        .map(|(name, s)| (name, self.schema(s)))
                        .collect(),
                ))
            }
            Value::Object(inner) => Some(AdditionalProperties::Schema(self.schema(inner))),
            _ => None,
        });
        let node = Node::Schema(Schema {
            name: None,
            reference: string(obj, "$ref"),
            schema_type: string(obj, "type"),
            format: string(obj, "format"),
            title: string(obj, "title"),
            description: string(obj, "description"),
            enumeration: obj.get("enum").and_then(Value::as_array).cloned(),
            default: obj.get("default").cloned(),
            example: obj.get("example").cloned(),
            pattern: string(obj, "pattern"),
            nullable: flag(obj, "nullable"),
            read_only: flag(obj, "readOnly"),
            required: array(obj, "required")
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            properties: self.map_of(obj, "properties", Builder::schema),
            items: object(obj, "items").map(|s| self.schema(s)),
            all_of: self.list_of(obj, "allOf", Builder::schema),
            one_of: self.list_of(obj, "oneOf", Builder::schema),
            any_of: self.list_of(obj, "anyOf", Builder::schema),
            not: object(obj, "not").map(|s| self.schema(s)),
            additional_properties,
            extensions: self.extensions(obj),
        });
        self.doc.set(id, node);
        id
    }

    fn untyped(&mut self, value: &Value) -> NodeId {
        let id = self.doc.reserve();
        let node = self.untyped_node(value);
        self.doc.set(id, node);
        id
    }

    fn untyped_node(&mut self, value: &Value) -> Node {
        match value {
            Value::Object(map) => Node::Object(
                map.iter()
                    .map(|(key, v)| (key.clone(), self.untyped(v)))
                    .collect(),
            ),
            Value::Array(items) => Node::Array(items.iter().map(|v| self.untyped(v)).collect()),
            other => Node::Scalar(other.clone()),
        }
    }
}

/// An `additionalProperties` object without schema keywords whose values are
/// all mappings is read as named schemas.
fn is_named_schema_map(obj: &Map<String, Value>) -> bool {
    !obj.is_empty()
        && obj
            .iter()
            .all(|(key, value)| !SCHEMA_KEYWORDS.contains(&key.as_str()) && value.is_object())
}
