use super::common::*;
use oaslint::{Context, Dialect, Method, Pointer, Violation};

// ─── Construction ───────────────────────────────────────────────────────────

#[test]
fn open_api_builds_canonical_context() {
    let ctx = open(PETSTORE);
    assert_eq!(ctx.dialect(), Dialect::OpenApi);
    assert!(ctx.legacy().is_none());
    assert_eq!(ctx.document().root().openapi, "3.0.0");
    assert_eq!(ctx.document().operations().len(), 3);
}

#[test]
fn from_text_detects_openapi() {
    let ctx = Context::from_text(PETSTORE).expect("should parse");
    assert_eq!(ctx.dialect(), Dialect::OpenApi);
}

#[test]
fn open_api_returns_none_for_unparsable_text() {
    assert!(Context::open_api("openapi: [unterminated").is_none());
    assert!(Context::open_api("").is_none());
}

#[test]
fn open_api_rejects_swagger_document() {
    let yaml = r#"
swagger: "2.0"
info:
  title: t
  version: "1"
paths: {}
"#;
    assert!(Context::open_api(yaml).is_none());
    assert!(Context::swagger(yaml).is_some());
}

#[test]
fn json_input_is_accepted() {
    let json = r##"{
  "openapi": "3.0.1",
  "info": {"title": "t", "version": "1"},
  "paths": {"/a": {"get": {"responses": {"200": {"description": "ok"}}}}}
}"##;
    let ctx = open(json);
    assert_eq!(ctx.document().operations().len(), 1);
}

// ─── Pointers ───────────────────────────────────────────────────────────────

#[test]
fn component_definitions_keep_home_pointer() {
    let ctx = open(PETSTORE);
    let pet = ctx.document().component_schema("Pet").expect("Pet exists");
    assert_eq!(
        ctx.pointer_for(pet),
        Some(ptr("/components/schemas/Pet"))
    );
}

#[test]
fn referenced_schema_is_shared_with_its_use_site() {
    let ctx = open(PETSTORE);
    let pet = ctx.document().component_schema("Pet").expect("Pet exists");
    let used = node_at(
        &ctx,
        "/paths/~1pets~1{petId}/get/responses/200/content/application~1json/schema",
    );
    assert_eq!(used, pet);
}

#[test]
fn inline_nodes_get_traversal_pointer() {
    let ctx = open(PETSTORE);
    let id = node_at(&ctx, "/paths/~1pets~1{petId}/get/parameters/0/schema");
    assert_eq!(
        ctx.pointer_for(id).map(|p| p.to_string()),
        Some("/paths/~1pets~1{petId}/get/parameters/0/schema".to_string())
    );
}

#[test]
fn every_indexed_node_resolves_back_to_itself() {
    let ctx = open(PETSTORE);
    for (id, pointer) in ctx.index().entries() {
        assert_eq!(
            ctx.document().resolve(pointer),
            Some(id),
            "pointer {} did not resolve back",
            pointer
        );
    }
}

#[test]
fn collapsed_reference_markers_are_not_indexed() {
    let ctx = open(PETSTORE);
    let unindexed: Vec<_> = ctx
        .document()
        .ids()
        .filter(|id| !ctx.index().contains(*id))
        .collect();
    assert!(!unindexed.is_empty());
    for id in unindexed {
        assert!(ctx.document().node(id).reference().is_some());
        assert_eq!(ctx.pointer_for(id), None);
    }
}

#[test]
fn extension_values_are_indexed() {
    let ctx = open(PETSTORE);
    let id = node_at(&ctx, "/info/x-audience");
    assert_eq!(ctx.pointer_for(id), Some(ptr("/info/x-audience")));
}

// ─── Violation factories ────────────────────────────────────────────────────

#[test]
fn violation_at_unindexed_node_falls_back_to_trace() {
    let ctx = open(PETSTORE);
    let marker = ctx
        .document()
        .ids()
        .find(|id| !ctx.index().contains(*id))
        .expect("an unindexed marker");
    ctx.api().servers()[0].touch();
    let v = ctx.violation("dangling", marker);
    assert_eq!(v.pointer, Some(ptr("/servers/0")));
}

#[test]
fn violation_at_unindexed_node_without_trace_is_root() {
    let ctx = open(PETSTORE);
    let marker = ctx
        .document()
        .ids()
        .find(|id| !ctx.index().contains(*id))
        .expect("an unindexed marker");
    let _api = ctx.api();
    assert_eq!(ctx.violation("dangling", marker).pointer, Some(ptr("")));
}

#[test]
fn violation_with_explicit_pointer_keeps_it() {
    let ctx = open(PETSTORE);
    let v = ctx.violation("here", ptr("/components/schemas/Pet"));
    assert_eq!(v.pointer, Some(ptr("/components/schemas/Pet")));
    assert_eq!(v.description, "here");
}

#[test]
fn violations_repeats_description_per_location() {
    let ctx = open(PETSTORE);
    let vs = ctx.violations("twice", [ptr("/servers/0"), ptr("/servers/1")]);
    assert_eq!(vs.len(), 2);
    assert!(vs.iter().all(|v| v.description == "twice"));
    assert_eq!(vs[1].pointer, Some(ptr("/servers/1")));
}

#[test]
fn violation_serializes_pointer_as_string_or_null() {
    let ctx = open(PETSTORE);
    let located = serde_json::to_value(ctx.violation("a", ptr("/paths/~1pets"))).unwrap();
    assert_eq!(
        located,
        serde_json::json!({"description": "a", "pointer": "/paths/~1pets"})
    );
    let unlocated = serde_json::to_value(Violation::new("b", None)).unwrap();
    assert_eq!(
        unlocated,
        serde_json::json!({"description": "b", "pointer": null})
    );
}

// ─── resolve_schema ─────────────────────────────────────────────────────────

#[test]
fn resolve_schema_finds_component() {
    let ctx = open(PETSTORE);
    assert_eq!(
        ctx.resolve_schema("#/components/schemas/Pet"),
        ctx.document().component_schema("Pet")
    );
}

#[test]
fn resolve_schema_follows_aliases() {
    let yaml = r##"
openapi: 3.0.0
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Pet:
      type: object
    Animal:
      $ref: "#/components/schemas/Pet"
"##;
    let ctx = open(yaml);
    assert_eq!(
        ctx.resolve_schema("#/components/schemas/Animal"),
        ctx.document().component_schema("Pet")
    );
}

#[test]
fn resolve_schema_misses() {
    let ctx = open(PETSTORE);
    assert_eq!(ctx.resolve_schema("#/components/schemas/Missing"), None);
    assert_eq!(ctx.resolve_schema("not a pointer"), None);
    assert_eq!(ctx.resolve_schema("#/components/parameters/Limit"), None);
}

// ─── Iteration helpers ──────────────────────────────────────────────────────

#[test]
fn validate_paths_applies_filter_and_flattens() {
    let ctx = open(PETSTORE);
    let vs = ctx.validate_paths(
        |path, _| path.contains('{'),
        |path, item| Some(ctx.violation(path, item)),
    );
    assert_eq!(vs.len(), 1);
    assert_eq!(vs[0].pointer, Some(ptr("/paths/~1pets~1{petId}")));
}

#[test]
fn validate_operations_visits_in_document_order() {
    let ctx = open(PETSTORE);
    let vs = ctx.validate_operations(
        |_, _, _| true,
        |path, method, op| vec![ctx.violation(format!("{} {}", method.as_str(), path), op)],
    );
    let descriptions: Vec<_> = vs.iter().map(|v| v.description.as_str()).collect();
    assert_eq!(
        descriptions,
        ["get /pets", "post /pets", "get /pets/{petId}"]
    );
    assert_eq!(vs[1].pointer, Some(ptr("/paths/~1pets/post")));
}

#[test]
fn validate_operations_drops_none_results() {
    let ctx = open(PETSTORE);
    let vs = ctx.validate_operations(
        |_, method, _| method == Method::Get,
        |_, _, op| -> Option<Violation> {
            let id = op.node().as_operation()?.operation_id.clone()?;
            (id == "showPet").then(|| ctx.violation_here("found"))
        },
    );
    assert_eq!(vs.len(), 1);
    assert_eq!(vs[0].pointer, Some(ptr("/paths/~1pets~1{petId}/get")));
}

#[test]
fn validate_schemas_sees_each_schema_once() {
    let ctx = open(PETSTORE);
    let mut seen = Vec::new();
    let vs = ctx.validate_schemas(
        |_, schema| {
            schema
                .node()
                .as_schema()
                .and_then(|s| s.schema_type.as_deref())
                == Some("object")
        },
        |info, schema| {
            seen.push(info.schema);
            Some(ctx.violation("object", schema))
        },
    );
    assert_eq!(vs.len(), 2);
    assert_eq!(vs[0].pointer, Some(ptr("/components/schemas/Pet")));
    assert_eq!(vs[1].pointer, Some(ptr("/components/schemas/PetList")));
    seen.dedup();
    assert_eq!(seen.len(), 2);
}

#[test]
fn validate_parameters_deduplicates_shared_definitions() {
    let ctx = open(PETSTORE);
    let mut names = Vec::new();
    ctx.validate_parameters(
        |_| true,
        |param| {
            names.push(param.node().as_parameter().and_then(|p| p.name.clone()));
            None::<Violation>
        },
    );
    assert_eq!(
        names,
        [
            Some("limit".to_string()),
            Some("X-Flow-Id".to_string()),
            Some("petId".to_string()),
        ]
    );
}

#[test]
fn validate_parameters_locates_at_component_pointer() {
    let ctx = open(PETSTORE);
    let vs = ctx.validate_parameters(
        |param| param.node().as_parameter().and_then(|p| p.location.as_deref()) == Some("query"),
        |param| Some(ctx.violation("query", param)),
    );
    assert_eq!(vs.len(), 1);
    assert_eq!(vs[0].pointer, Some(ptr("/components/parameters/Limit")));
}

#[test]
fn pointer_display_matches_expected_escaping() {
    let ctx = open(PETSTORE);
    let item = node_at(&ctx, "/paths/~1pets");
    let pointer: Pointer = ctx.pointer_for(item).unwrap();
    assert_eq!(pointer.to_string(), "/paths/~1pets");
    assert_eq!(pointer.tokens(), ["paths", "/pets"]);
}

// ─── Document shape ─────────────────────────────────────────────────────────

#[test]
fn x_prefixed_names_are_entries_outside_extension_maps() {
    let yaml = r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  x-internal:
    owner: platform
  /things:
    get:
      responses:
        "200":
          description: ok
          headers:
            x-flow-id:
              schema:
                type: string
        x-note: ignored
components:
  schemas:
    Thing:
      type: object
      properties:
        x-foo:
          type: string
          enum: [a, b]
"#;
    let ctx = open(yaml);
    let root = ctx.document().root();
    let paths: Vec<_> = root.paths.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(paths, ["/things"]);
    assert_eq!(ctx.document().operations().len(), 1);

    let property = node_at(&ctx, "/components/schemas/Thing/properties/x-foo");
    assert_eq!(
        ctx.pointer_for(property),
        Some(ptr("/components/schemas/Thing/properties/x-foo"))
    );
    let header = node_at(&ctx, "/paths/~1things/get/responses/200/headers/x-flow-id");
    assert!(ctx.document().node(header).as_header().is_some());
    assert!(ctx.document().resolve(&ptr("/paths/~1things/get/responses/x-note")).is_none());

    let report = oaslint::lint(
        yaml,
        &oaslint::Registry::with_builtin_rules(),
        &oaslint::LintConfig::default(),
    )
    .unwrap();
    let enums: Vec<_> = report.for_rule("107").collect();
    assert_eq!(enums.len(), 1);
    assert_eq!(
        enums[0].pointer,
        Some(ptr("/components/schemas/Thing/properties/x-foo"))
    );
}

#[test]
fn array_indices_are_canonical() {
    let ctx = open(PETSTORE);
    assert!(ctx.document().resolve(&ptr("/servers/1")).is_some());
    assert!(ctx.document().resolve(&ptr("/servers/0")).is_some());
    assert_eq!(ctx.document().resolve(&ptr("/servers/01")), None);
    assert_eq!(ctx.document().resolve(&ptr("/servers/+1")), None);
    assert_eq!(ctx.document().resolve(&ptr("/servers/-0")), None);
}
