//! Swagger v2 → OpenAPI v3 conversion.
//!
//! The converter works on `serde_json::Value` trees and records, for every
//! object it emits, the legacy location it was converted from. Those
//! provenance entries cover whole subtrees: a canonical pointer below a
//! recorded one maps to the legacy pointer extended by the same suffix.
//! [`LegacyTree::translate`] uses them to report violations in the
//! vocabulary of the document the user actually wrote.

use crate::build::build_untyped;
use crate::index::ReverseIndex;
use crate::model::Document;
use crate::pointer::Pointer;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use tracing::debug;

const DEFAULT_MEDIA_TYPE: &str = "application/json";
const FORM_MEDIA_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_MEDIA_TYPE: &str = "multipart/form-data";

/// Parameter keywords that move into the synthesized v3 `schema`.
const SCHEMA_FIELDS: &[&str] = &[
    "type",
    "format",
    "items",
    "enum",
    "default",
    "maximum",
    "exclusiveMaximum",
    "minimum",
    "exclusiveMinimum",
    "maxLength",
    "minLength",
    "pattern",
    "maxItems",
    "minItems",
    "uniqueItems",
    "multipleOf",
];

/// Canonical → legacy pointer correspondences recorded during conversion.
#[derive(Clone, Debug, Default)]
pub struct Provenance {
    entries: HashMap<Pointer, Pointer>,
}

impl Provenance {
    fn record(&mut self, canonical: &Pointer, legacy: &Pointer) {
        self.entries.insert(canonical.clone(), legacy.clone());
    }

    /// The legacy counterpart of `canonical`, from the closest recorded
    /// ancestor-or-self.
    pub fn lookup(&self, canonical: &Pointer) -> Option<Pointer> {
        canonical.ancestors().find_map(|ancestor| {
            let legacy = self.entries.get(&ancestor)?;
            let suffix = canonical.strip_prefix(&ancestor)?;
            Some(suffix.iter().fold(legacy.clone(), |p, t| p.child(t.as_str())))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of converting a legacy document.
#[derive(Clone, Debug)]
pub struct Conversion {
    /// The canonical (OpenAPI v3) document value.
    pub value: Value,
    pub provenance: Provenance,
    /// Constructs that could not be carried over faithfully.
    pub notes: Vec<String>,
}

/// The original legacy document kept next to the canonical tree.
#[derive(Clone, Debug)]
pub struct LegacyTree {
    pub document: Document,
    pub index: ReverseIndex,
    pub provenance: Provenance,
}

impl LegacyTree {
    pub fn new(source: &Value, provenance: Provenance) -> Self {
        let document = build_untyped(source);
        let index = ReverseIndex::build(&document);
        LegacyTree {
            document,
            index,
            provenance,
        }
    }

    /// Maps a canonical pointer into the legacy document: the recorded
    /// counterpart when it exists in the legacy tree, otherwise a structural
    /// rewrite.
    pub fn translate(&self, canonical: &Pointer) -> Pointer {
        self.provenance
            .lookup(canonical)
            .filter(|legacy| self.document.resolve(legacy).is_some())
            .unwrap_or_else(|| legacy_pointer(canonical))
    }
}

/// Rewrites a canonical pointer into the legacy layout by token patterns.
/// Used for nodes that only exist because of the conversion.
pub fn legacy_pointer(canonical: &Pointer) -> Pointer {
    let tokens = canonical.tokens();
    let mut out: Vec<String> = match tokens {
        [first, ..] if first == "servers" => return Pointer::from_tokens(["host"]),
        [first, section, rest @ ..] if first == "components" => {
            let head = match section.as_str() {
                "schemas" => "definitions",
                "parameters" | "requestBodies" => "parameters",
                "responses" => "responses",
                _ => return canonical.clone(),
            };
            std::iter::once(head.to_string())
                .chain(rest.iter().cloned())
                .collect()
        }
        _ => tokens.to_vec(),
    };

    let mut i = 0;
    while i < out.len() {
        match out[i].as_str() {
            // content/<media>/schema → schema
            "content" if i + 1 < out.len() => {
                out.drain(i..i + 2);
            }
            // An operation's requestBody/... → its parameters list. The
            // body's index in that list is unknown here.
            "requestBody" if i == 3 && out[0] == "paths" => {
                out[i] = "parameters".to_string();
                out.truncate(i + 1);
                break;
            }
            // parameters/<n>/schema → parameters/<n>
            "parameters" if out.get(i + 2).is_some_and(|t| t == "schema") => {
                out.remove(i + 2);
                i += 2;
            }
            _ => i += 1,
        }
    }
    Pointer::from_tokens(out)
}

/// True when `value` is a Swagger 2.0 document.
pub fn is_swagger(value: &Value) -> bool {
    match value.get("swagger") {
        Some(Value::String(v)) => v.starts_with("2."),
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| (2.0..3.0).contains(&v)),
        _ => false,
    }
}

/// Converts a Swagger 2.0 value into an OpenAPI 3.0 value.
pub fn convert(source: &Value) -> Conversion {
    let empty = Map::new();
    let root = source.as_object().unwrap_or(&empty);
    let mut converter = Converter {
        provenance: Provenance::default(),
        notes: Vec::new(),
        body_parameters: body_parameter_names(root),
        consumes: media_types(root, "consumes"),
        produces: media_types(root, "produces"),
    };
    let value = converter.document(root);
    for note in &converter.notes {
        debug!(note = %note, "conversion");
    }
    Conversion {
        value,
        provenance: converter.provenance,
        notes: converter.notes,
    }
}

fn body_parameter_names(root: &Map<String, Value>) -> HashSet<String> {
    root.get("parameters")
        .and_then(Value::as_object)
        .map(|params| {
            params
                .iter()
                .filter(|(_, p)| p.get("in").and_then(Value::as_str) == Some("body"))
                .map(|(name, _)| name.clone())
                .collect()
        })
        .unwrap_or_default()
}

fn media_types(obj: &Map<String, Value>, key: &str) -> Option<Vec<String>> {
    let list: Vec<String> = obj
        .get(key)?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();
    (!list.is_empty()).then_some(list)
}

fn copy_extensions(from: &Map<String, Value>, to: &mut Map<String, Value>) {
    for (key, value) in from.iter().filter(|(k, _)| k.starts_with("x-")) {
        to.insert(key.clone(), value.clone());
    }
}

fn copy_fields(from: &Map<String, Value>, to: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        if let Some(value) = from.get(*field) {
            to.insert(field.to_string(), value.clone());
        }
    }
}

struct Converter {
    provenance: Provenance,
    notes: Vec<String>,
    body_parameters: HashSet<String>,
    consumes: Option<Vec<String>>,
    produces: Option<Vec<String>>,
}

impl Converter {
    fn document(&mut self, root: &Map<String, Value>) -> Value {
        let legacy = Pointer::root();
        let canonical = Pointer::root();
        let mut out = Map::new();
        out.insert("openapi".to_string(), json!("3.0.0"));

        if let Some(info) = root.get("info") {
            out.insert("info".to_string(), info.clone());
            self.provenance
                .record(&canonical.child("info"), &legacy.child("info"));
        }

        if let Some(host) = root.get("host").and_then(Value::as_str) {
            let base_path = root.get("basePath").and_then(Value::as_str).unwrap_or("");
            out.insert(
                "servers".to_string(),
                json!([{ "url": format!("{}{}", host, base_path) }]),
            );
            self.provenance
                .record(&canonical.child("servers").index(0), &legacy.child("host"));
        } else if root.contains_key("basePath") {
            self.notes
                .push("basePath without host cannot be expressed as a server".to_string());
        }

        if let Some(tags) = root.get("tags") {
            out.insert("tags".to_string(), tags.clone());
            self.provenance
                .record(&canonical.child("tags"), &legacy.child("tags"));
        }
        copy_fields(root, &mut out, &["externalDocs", "security"]);
        copy_extensions(root, &mut out);

        let components = self.components(root);
        if !components.is_empty() {
            out.insert("components".to_string(), Value::Object(components));
        }

        let mut paths = Map::new();
        if let Some(legacy_paths) = root.get("paths").and_then(Value::as_object) {
            for (path, item) in legacy_paths {
                let Some(item) = item.as_object() else {
                    continue;
                };
                if path.starts_with("x-") {
                    paths.insert(path.clone(), Value::Object(item.clone()));
                    continue;
                }
                let legacy_item = legacy.child("paths").child(path.as_str());
                let canonical_item = canonical.child("paths").child(path.as_str());
                let converted = self.path_item(item, &legacy_item, &canonical_item);
                paths.insert(path.clone(), converted);
            }
        }
        out.insert("paths".to_string(), Value::Object(paths));

        if root.contains_key("securityDefinitions") {
            self.notes
                .push("securityDefinitions are not converted".to_string());
        }
        Value::Object(out)
    }

    fn components(&mut self, root: &Map<String, Value>) -> Map<String, Value> {
        let mut components = Map::new();
        let canonical = Pointer::root().child("components");

        if let Some(definitions) = root.get("definitions").and_then(Value::as_object) {
            let mut schemas = Map::new();
            for (name, schema) in definitions {
                let legacy = Pointer::root().child("definitions").child(name.as_str());
                let target = canonical.child("schemas").child(name.as_str());
                schemas.insert(name.clone(), self.schema(schema));
                self.provenance.record(&target, &legacy);
            }
            components.insert("schemas".to_string(), Value::Object(schemas));
        }

        if let Some(params) = root.get("parameters").and_then(Value::as_object) {
            let mut parameters = Map::new();
            let mut bodies = Map::new();
            for (name, param) in params {
                let Some(param) = param.as_object() else {
                    continue;
                };
                let legacy = Pointer::root().child("parameters").child(name.as_str());
                if self.body_parameters.contains(name) {
                    let target = canonical.child("requestBodies").child(name.as_str());
                    let consumes = self.consumes.clone();
                    bodies.insert(
                        name.clone(),
                        self.request_body(param, consumes.as_deref(), &legacy, &target),
                    );
                } else {
                    let target = canonical.child("parameters").child(name.as_str());
                    parameters.insert(name.clone(), self.parameter(param, &legacy, &target));
                }
            }
            if !parameters.is_empty() {
                components.insert("parameters".to_string(), Value::Object(parameters));
            }
            if !bodies.is_empty() {
                components.insert("requestBodies".to_string(), Value::Object(bodies));
            }
        }

        if let Some(responses) = root.get("responses").and_then(Value::as_object) {
            let mut converted = Map::new();
            let produces = self.produces.clone();
            for (name, response) in responses {
                let Some(response) = response.as_object() else {
                    continue;
                };
                let legacy = Pointer::root().child("responses").child(name.as_str());
                let target = canonical.child("responses").child(name.as_str());
                converted.insert(
                    name.clone(),
                    self.response(response, produces.as_deref(), &legacy, &target),
                );
            }
            components.insert("responses".to_string(), Value::Object(converted));
        }
        components
    }

    fn path_item(
        &mut self,
        item: &Map<String, Value>,
        legacy: &Pointer,
        canonical: &Pointer,
    ) -> Value {
        self.provenance.record(canonical, legacy);
        let mut out = Map::new();
        copy_fields(item, &mut out, &["summary", "description"]);
        copy_extensions(item, &mut out);

        if item.contains_key("$ref") {
            self.notes
                .push(format!("path item reference at {} is not followed", legacy));
        }

        let mut parameters = Vec::new();
        for (i, param) in item
            .get("parameters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .enumerate()
        {
            let Some(param) = param.as_object() else {
                continue;
            };
            let legacy_param = legacy.child("parameters").index(i);
            match param.get("in").and_then(Value::as_str) {
                Some("body") | Some("formData") => self.notes.push(format!(
                    "path-level body parameter at {} is not converted",
                    legacy_param
                )),
                _ => {
                    let target = canonical.child("parameters").index(parameters.len());
                    parameters.push(self.parameter(param, &legacy_param, &target));
                }
            }
        }
        if !parameters.is_empty() {
            out.insert("parameters".to_string(), Value::Array(parameters));
        }

        for method in crate::model::Method::ALL {
            let Some(op) = item.get(method.as_str()).and_then(Value::as_object) else {
                continue;
            };
            let converted = self.operation(
                op,
                &legacy.child(method.as_str()),
                &canonical.child(method.as_str()),
            );
            out.insert(method.as_str().to_string(), converted);
        }
        Value::Object(out)
    }

    fn operation(&mut self, op: &Map<String, Value>, legacy: &Pointer, canonical: &Pointer) -> Value {
        self.provenance.record(canonical, legacy);
        let mut out = Map::new();
        copy_fields(
            op,
            &mut out,
            &[
                "tags",
                "summary",
                "description",
                "operationId",
                "deprecated",
                "externalDocs",
                "security",
            ],
        );
        copy_extensions(op, &mut out);

        let consumes = media_types(op, "consumes").or_else(|| self.consumes.clone());
        let produces = media_types(op, "produces").or_else(|| self.produces.clone());

        let mut parameters = Vec::new();
        let mut form_fields: Vec<(usize, &Map<String, Value>)> = Vec::new();
        for (i, param) in op
            .get("parameters")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .enumerate()
        {
            let Some(param) = param.as_object() else {
                continue;
            };
            let legacy_param = legacy.child("parameters").index(i);
            if let Some(reference) = param.get("$ref").and_then(Value::as_str)
                && let Some(name) = reference.strip_prefix("#/parameters/")
                && self.body_parameters.contains(name)
            {
                out.insert(
                    "requestBody".to_string(),
                    json!({ "$ref": format!("#/components/requestBodies/{}", name) }),
                );
                self.provenance
                    .record(&canonical.child("requestBody"), &legacy_param);
                continue;
            }
            match param.get("in").and_then(Value::as_str) {
                Some("body") => {
                    let target = canonical.child("requestBody");
                    let body = self.request_body(param, consumes.as_deref(), &legacy_param, &target);
                    out.insert("requestBody".to_string(), body);
                }
                Some("formData") => form_fields.push((i, param)),
                _ => {
                    let target = canonical.child("parameters").index(parameters.len());
                    parameters.push(self.parameter(param, &legacy_param, &target));
                }
            }
        }
        if !parameters.is_empty() {
            out.insert("parameters".to_string(), Value::Array(parameters));
        }
        if !form_fields.is_empty() {
            let body = self.form_body(&form_fields, consumes.as_deref(), legacy, canonical);
            out.insert("requestBody".to_string(), body);
        }

        if let Some(responses) = op.get("responses").and_then(Value::as_object) {
            let mut converted = Map::new();
            for (code, response) in responses {
                let Some(response) = response.as_object() else {
                    continue;
                };
                let legacy_response = legacy.child("responses").child(code.as_str());
                let target = canonical.child("responses").child(code.as_str());
                converted.insert(
                    code.clone(),
                    self.response(response, produces.as_deref(), &legacy_response, &target),
                );
            }
            out.insert("responses".to_string(), Value::Object(converted));
        }
        Value::Object(out)
    }

    fn parameter(&mut self, param: &Map<String, Value>, legacy: &Pointer, canonical: &Pointer) -> Value {
        self.provenance.record(canonical, legacy);
        if let Some(reference) = param.get("$ref").and_then(Value::as_str) {
            return json!({ "$ref": self.rewrite_ref(reference) });
        }
        let mut out = Map::new();
        copy_fields(
            param,
            &mut out,
            &["name", "in", "description", "required", "allowEmptyValue"],
        );
        copy_extensions(param, &mut out);
        match param.get("collectionFormat").and_then(Value::as_str) {
            Some("multi") => {
                out.insert("explode".to_string(), json!(true));
            }
            Some("csv") => {
                out.insert("explode".to_string(), json!(false));
            }
            Some(other) => self.notes.push(format!(
                "collectionFormat '{}' at {} is not converted",
                other, legacy
            )),
            None => {}
        }
        out.insert("schema".to_string(), self.synthesized_schema(param));
        self.provenance.record(&canonical.child("schema"), legacy);
        Value::Object(out)
    }

    /// The v3 schema built from a v2 parameter's or header's inline keywords.
    fn synthesized_schema(&mut self, source: &Map<String, Value>) -> Value {
        let mut schema = Map::new();
        copy_fields(source, &mut schema, SCHEMA_FIELDS);
        if schema.get("type").and_then(Value::as_str) == Some("file") {
            schema.insert("type".to_string(), json!("string"));
            schema.insert("format".to_string(), json!("binary"));
        }
        self.schema(&Value::Object(schema))
    }

    fn request_body(
        &mut self,
        param: &Map<String, Value>,
        consumes: Option<&[String]>,
        legacy: &Pointer,
        canonical: &Pointer,
    ) -> Value {
        self.provenance.record(canonical, legacy);
        let schema = param
            .get("schema")
            .map(|s| self.schema(s))
            .unwrap_or_else(|| json!({}));
        let content = self.shared_content(
            schema,
            consumes.unwrap_or(&[DEFAULT_MEDIA_TYPE.to_string()]),
            &legacy.child("schema"),
            canonical,
        );
        let mut out = Map::new();
        copy_fields(param, &mut out, &["description", "required"]);
        copy_extensions(param, &mut out);
        out.insert("content".to_string(), Value::Object(content));
        Value::Object(out)
    }

    fn form_body(
        &mut self,
        fields: &[(usize, &Map<String, Value>)],
        consumes: Option<&[String]>,
        legacy: &Pointer,
        canonical: &Pointer,
    ) -> Value {
        let has_file = fields
            .iter()
            .any(|(_, p)| p.get("type").and_then(Value::as_str) == Some("file"));
        let multipart = has_file
            || consumes.is_some_and(|c| c.iter().any(|m| m == MULTIPART_MEDIA_TYPE));
        let media = if multipart {
            MULTIPART_MEDIA_TYPE
        } else {
            FORM_MEDIA_TYPE
        };
        if let Some((first, _)) = fields.first() {
            self.provenance.record(
                &canonical.child("requestBody"),
                &legacy.child("parameters").index(*first),
            );
        }
        let schema_pointer = canonical
            .child("requestBody")
            .child("content")
            .child(media)
            .child("schema");

        let mut properties = Map::new();
        let mut required = Vec::new();
        for (i, param) in fields {
            let Some(name) = param.get("name").and_then(Value::as_str) else {
                continue;
            };
            let mut property = self.synthesized_schema(param);
            if let (Some(description), Value::Object(p)) = (param.get("description"), &mut property)
            {
                p.insert("description".to_string(), description.clone());
            }
            properties.insert(name.to_string(), property);
            if param.get("required").and_then(Value::as_bool) == Some(true) {
                required.push(json!(name));
            }
            self.provenance.record(
                &schema_pointer.child("properties").child(name),
                &legacy.child("parameters").index(*i),
            );
        }
        let mut schema = Map::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        let mut content = Map::new();
        content.insert(media.to_string(), json!({ "schema": Value::Object(schema) }));
        json!({ "content": Value::Object(content) })
    }

    fn response(
        &mut self,
        response: &Map<String, Value>,
        produces: Option<&[String]>,
        legacy: &Pointer,
        canonical: &Pointer,
    ) -> Value {
        self.provenance.record(canonical, legacy);
        if let Some(reference) = response.get("$ref").and_then(Value::as_str) {
            return json!({ "$ref": self.rewrite_ref(reference) });
        }
        let mut out = Map::new();
        out.insert(
            "description".to_string(),
            response.get("description").cloned().unwrap_or(json!("")),
        );
        copy_extensions(response, &mut out);

        if let Some(headers) = response.get("headers").and_then(Value::as_object) {
            let mut converted = Map::new();
            for (name, header) in headers {
                let Some(header) = header.as_object() else {
                    continue;
                };
                let legacy_header = legacy.child("headers").child(name.as_str());
                let target = canonical.child("headers").child(name.as_str());
                let mut out_header = Map::new();
                copy_fields(header, &mut out_header, &["description"]);
                copy_extensions(header, &mut out_header);
                out_header.insert("schema".to_string(), self.synthesized_schema(header));
                converted.insert(name.clone(), Value::Object(out_header));
                self.provenance.record(&target, &legacy_header);
                self.provenance
                    .record(&target.child("schema"), &legacy_header);
            }
            out.insert("headers".to_string(), Value::Object(converted));
        }

        if let Some(schema) = response.get("schema") {
            let schema = self.schema(schema);
            let content = self.shared_content(
                schema,
                produces.unwrap_or(&[DEFAULT_MEDIA_TYPE.to_string()]),
                &legacy.child("schema"),
                canonical,
            );
            out.insert("content".to_string(), Value::Object(content));
        }
        if response.contains_key("examples") {
            self.notes
                .push(format!("response examples at {} are not converted", legacy));
        }
        Value::Object(out)
    }

    /// One content entry per media type, all sharing a single schema: the
    /// first media type holds it, the others reference it.
    fn shared_content(
        &mut self,
        schema: Value,
        media_types: &[String],
        legacy_schema: &Pointer,
        canonical: &Pointer,
    ) -> Map<String, Value> {
        let mut content = Map::new();
        let mut schema = Some(schema);
        let mut home = Pointer::root();
        for media in media_types {
            if content.contains_key(media) {
                continue;
            }
            let target = canonical.child("content").child(media.as_str()).child("schema");
            let entry = match schema.take() {
                Some(schema) => {
                    home = target.clone();
                    schema
                }
                None => json!({ "$ref": home.to_fragment() }),
            };
            content.insert(media.clone(), json!({ "schema": entry }));
            self.provenance.record(&target, legacy_schema);
        }
        content
    }

    /// Deep copy of a schema with `$ref` targets moved to the v3 layout.
    fn schema(&mut self, schema: &Value) -> Value {
        match schema {
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| {
                        let converted = match (key.as_str(), value) {
                            ("$ref", Value::String(reference)) => json!(self.rewrite_ref(reference)),
                            ("discriminator", Value::String(property)) => {
                                json!({ "propertyName": property })
                            }
                            ("type", Value::String(t)) if t == "file" => json!("string"),
                            _ => self.schema(value),
                        };
                        (key.clone(), converted)
                    })
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.schema(v)).collect()),
            other => other.clone(),
        }
    }

    fn rewrite_ref(&mut self, reference: &str) -> String {
        if let Some(name) = reference.strip_prefix("#/definitions/") {
            format!("#/components/schemas/{}", name)
        } else if let Some(name) = reference.strip_prefix("#/parameters/") {
            if self.body_parameters.contains(name) {
                format!("#/components/requestBodies/{}", name)
            } else {
                format!("#/components/parameters/{}", name)
            }
        } else if let Some(name) = reference.strip_prefix("#/responses/") {
            format!("#/components/responses/{}", name)
        } else {
            if !reference.starts_with('#') {
                self.notes
                    .push(format!("external reference '{}' is kept as-is", reference));
            }
            reference.to_string()
        }
    }
}
