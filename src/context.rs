//! The lint context: one resolved document with its indexes and recorder.

use crate::build::build;
use crate::convert::{LegacyTree, convert};
use crate::error::ParseError;
use crate::index::ReverseIndex;
use crate::model::{Document, Method, NodeId};
use crate::parse::{Dialect, Parsed, parse, parse_as};
use crate::pointer::Pointer;
use crate::recorder::{Recorder, Tracked};
use crate::resolve::{Resolution, Target, backfill_names, follow, resolve_references};
use crate::rule::Violation;
use crate::walk::{SchemaInfo, all_schemas};
use std::collections::HashSet;
use tracing::debug;

/// Everything a check needs to inspect one document and locate findings.
///
/// A context is consumed by one linting run at a time: the recorder is
/// interior-mutable, so `Context` is not `Sync`.
#[derive(Debug)]
pub struct Context {
    document: Document,
    index: ReverseIndex,
    legacy: Option<LegacyTree>,
    recorder: Recorder,
    resolution: Resolution,
}

impl Context {
    /// Wraps an in-memory canonical document. References are resolved and
    /// component names back-filled before indexing.
    pub fn from_document(mut document: Document) -> Self {
        let resolution = resolve_references(&mut document);
        backfill_names(&mut document);
        let index = ReverseIndex::build(&document);
        debug!(nodes = document.len(), indexed = index.len(), "context built");
        Context {
            document,
            index,
            legacy: None,
            recorder: Recorder::new(),
            resolution,
        }
    }

    /// Parses an OpenAPI 3 document.
    pub fn try_open_api(input: &str) -> Result<Self, ParseError> {
        parse_as(input, Dialect::OpenApi).map(Context::from_parsed)
    }

    /// Parses a Swagger 2 document and converts it, keeping the original as a
    /// side tree for locating findings.
    pub fn try_swagger(input: &str) -> Result<Self, ParseError> {
        parse_as(input, Dialect::Swagger).map(Context::from_parsed)
    }

    /// Parses a document of either dialect.
    pub fn from_text(input: &str) -> Result<Self, ParseError> {
        parse(input).map(Context::from_parsed)
    }

    /// [`Context::try_open_api`], with failures logged and discarded.
    pub fn open_api(input: &str) -> Option<Self> {
        Context::try_open_api(input)
            .map_err(|e| debug!(error = %e, "not an OpenAPI 3 document"))
            .ok()
    }

    /// [`Context::try_swagger`], with failures logged and discarded.
    pub fn swagger(input: &str) -> Option<Self> {
        Context::try_swagger(input)
            .map_err(|e| debug!(error = %e, "not a Swagger 2 document"))
            .ok()
    }

    fn from_parsed(parsed: Parsed) -> Self {
        match parsed.dialect {
            Dialect::OpenApi => Context::from_document(build(&parsed.value)),
            Dialect::Swagger => {
                let conversion = convert(&parsed.value);
                let mut context = Context::from_document(build(&conversion.value));
                context.legacy = Some(LegacyTree::new(&parsed.value, conversion.provenance));
                context
            }
        }
    }

    pub fn dialect(&self) -> Dialect {
        match self.legacy {
            Some(_) => Dialect::Swagger,
            None => Dialect::OpenApi,
        }
    }

    /// A tracked handle on the root. Each call starts a fresh access scope.
    pub fn api(&self) -> Tracked<'_> {
        Tracked::root(&self.document, &self.recorder)
    }

    /// The canonical document, without access recording.
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn index(&self) -> &ReverseIndex {
        &self.index
    }

    pub fn legacy(&self) -> Option<&LegacyTree> {
        self.legacy.as_ref()
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    /// Resets the access scope without handing out a handle.
    pub fn reset_trace(&self) {
        self.recorder.reset();
    }

    /// Translates a canonical pointer into the pointer space of the input
    /// document.
    pub fn translate(&self, pointer: &Pointer) -> Pointer {
        match &self.legacy {
            Some(legacy) => legacy.translate(pointer),
            None => pointer.clone(),
        }
    }

    /// The input-document pointer of `id`, or `None` if it is not indexed.
    pub fn pointer_for(&self, id: NodeId) -> Option<Pointer> {
        self.index.pointer_for(id).map(|p| self.translate(p))
    }

    /// The most recently accessed location, translated.
    pub fn current_pointer(&self) -> Pointer {
        self.translate(&self.recorder.pointer())
    }

    pub fn violation(&self, description: impl Into<String>, location: impl Locate) -> Violation {
        Violation::new(description, location.locate(self))
    }

    /// A violation at the most recently accessed location.
    pub fn violation_here(&self, description: impl Into<String>) -> Violation {
        Violation::new(description, Some(self.current_pointer()))
    }

    /// One violation with the same description per location.
    pub fn violations<L: Locate>(
        &self,
        description: &str,
        locations: impl IntoIterator<Item = L>,
    ) -> Vec<Violation> {
        locations
            .into_iter()
            .map(|location| self.violation(description, location))
            .collect()
    }

    /// True when an ignore directive at or above `pointer` names `rule_id`.
    /// The pointer is in the input document's space.
    pub fn is_ignored(&self, pointer: &Pointer, rule_id: &str) -> bool {
        match &self.legacy {
            Some(legacy) => legacy.index.is_ignored(pointer, rule_id),
            None => self.index.is_ignored(pointer, rule_id),
        }
    }

    /// Looks up a local schema reference such as `#/components/schemas/Pet`,
    /// following alias chains to the concrete schema.
    pub fn resolve_schema(&self, reference: &str) -> Option<NodeId> {
        let pointer = Pointer::parse(reference).ok()?;
        let id = self.document.resolve(&pointer)?;
        match follow(&self.document, id) {
            Target::Concrete(concrete) => self.document.schema(concrete).map(|_| concrete),
            Target::Dangling(_) | Target::Defect(_) => None,
        }
    }

    /// A tracked handle on `id`, positioned at its indexed pointer.
    pub fn tracked(&self, id: NodeId) -> Option<Tracked<'_>> {
        let pointer = self.index.pointer_for(id)?.clone();
        Some(Tracked::at(&self.document, &self.recorder, id, pointer))
    }

    // ─── Iteration helpers ──────────────────────────────────────────────────

    /// Runs `action` on every path item accepted by `filter`.
    pub fn validate_paths<F, A, I>(&self, mut filter: F, mut action: A) -> Vec<Violation>
    where
        F: FnMut(&str, &Tracked<'_>) -> bool,
        A: FnMut(&str, &Tracked<'_>) -> I,
        I: IntoIterator,
        I::Item: Into<Option<Violation>>,
    {
        let mut out = Vec::new();
        for (path, item) in self.api().paths() {
            if filter(path, &item) {
                collect(&mut out, action(path, &item));
            }
        }
        out
    }

    /// Runs `action` on every operation accepted by `filter`.
    pub fn validate_operations<F, A, I>(&self, mut filter: F, mut action: A) -> Vec<Violation>
    where
        F: FnMut(&str, Method, &Tracked<'_>) -> bool,
        A: FnMut(&str, Method, &Tracked<'_>) -> I,
        I: IntoIterator,
        I::Item: Into<Option<Violation>>,
    {
        let mut out = Vec::new();
        for (path, item) in self.api().paths() {
            for (method, op) in item.operations() {
                if filter(path, method, &op) {
                    collect(&mut out, action(path, method, &op));
                }
            }
        }
        out
    }

    /// Runs `action` on every schema of the document accepted by `filter`.
    /// Handles are positioned at each schema's indexed pointer.
    pub fn validate_schemas<F, A, I>(&self, mut filter: F, mut action: A) -> Vec<Violation>
    where
        F: FnMut(&SchemaInfo, &Tracked<'_>) -> bool,
        A: FnMut(&SchemaInfo, &Tracked<'_>) -> I,
        I: IntoIterator,
        I::Item: Into<Option<Violation>>,
    {
        self.reset_trace();
        let mut out = Vec::new();
        for info in all_schemas(&self.document) {
            let Some(schema) = self.tracked(info.schema) else {
                continue;
            };
            if filter(&info, &schema) {
                collect(&mut out, action(&info, &schema));
            }
        }
        out
    }

    /// Runs `action` on every distinct parameter accepted by `filter`:
    /// component parameters, then path-level and operation parameters.
    pub fn validate_parameters<F, A, I>(&self, mut filter: F, mut action: A) -> Vec<Violation>
    where
        F: FnMut(&Tracked<'_>) -> bool,
        A: FnMut(&Tracked<'_>) -> I,
        I: IntoIterator,
        I::Item: Into<Option<Violation>>,
    {
        self.reset_trace();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        for id in self.parameter_ids() {
            if !seen.insert(id) || self.document.node(id).as_parameter().is_none() {
                continue;
            }
            let Some(param) = self.tracked(id) else {
                continue;
            };
            if filter(&param) {
                collect(&mut out, action(&param));
            }
        }
        out
    }

    fn parameter_ids(&self) -> Vec<NodeId> {
        let doc = &self.document;
        let mut ids: Vec<NodeId> = doc
            .components()
            .map(|c| c.parameters.iter().map(|(_, id)| *id).collect())
            .unwrap_or_default();
        for (_, item_id) in &doc.root().paths {
            let Some(item) = doc.node(*item_id).as_path_item() else {
                continue;
            };
            ids.extend(item.parameters.iter().copied());
            for (_, op) in &item.operations {
                if let Some(op) = doc.node(*op).as_operation() {
                    ids.extend(op.parameters.iter().copied());
                }
            }
        }
        ids
    }
}

fn collect<I>(out: &mut Vec<Violation>, produced: I)
where
    I: IntoIterator,
    I::Item: Into<Option<Violation>>,
{
    out.extend(produced.into_iter().filter_map(Into::into));
}

/// Something a violation can be located at.
///
/// Explicit locations resolve to their own pointer. A node without an index
/// entry and `Option::<Pointer>::None` both stand for "wherever the check last
/// looked".
pub trait Locate {
    fn locate(self, context: &Context) -> Option<Pointer>;
}

impl Locate for NodeId {
    fn locate(self, context: &Context) -> Option<Pointer> {
        context
            .pointer_for(self)
            .or_else(|| Some(context.current_pointer()))
    }
}

/// Canonical pointers are translated into the input document's space.
impl Locate for Pointer {
    fn locate(self, context: &Context) -> Option<Pointer> {
        Some(context.translate(&self))
    }
}

impl Locate for &Pointer {
    fn locate(self, context: &Context) -> Option<Pointer> {
        Some(context.translate(self))
    }
}

impl Locate for Option<Pointer> {
    fn locate(self, context: &Context) -> Option<Pointer> {
        match self {
            Some(pointer) => pointer.locate(context),
            None => Some(context.current_pointer()),
        }
    }
}

impl Locate for &Tracked<'_> {
    fn locate(self, context: &Context) -> Option<Pointer> {
        Some(context.translate(self.pointer()))
    }
}

impl Locate for Tracked<'_> {
    fn locate(self, context: &Context) -> Option<Pointer> {
        (&self).locate(context)
    }
}
