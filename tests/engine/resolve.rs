use super::common::*;
use oaslint::index::ReverseIndex;
use oaslint::resolve::{Target, backfill_names, follow, resolve_references};

const ALIASES: &str = r##"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  /pets:
    get:
      parameters:
        - $ref: "#/components/parameters/Limit"
      responses:
        "200":
          description: ok
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Animal"
components:
  schemas:
    Pet:
      type: object
      properties:
        parent:
          $ref: "#/components/schemas/Pet"
    Animal:
      $ref: "#/components/schemas/Pet"
  parameters:
    Limit:
      name: limit
      in: query
"##;

#[test]
fn references_collapse_onto_definitions() {
    let mut doc = unresolved(ALIASES);
    let resolution = resolve_references(&mut doc);
    assert!(resolution.rewritten >= 3);
    assert!(resolution.dangling.is_empty());
    assert!(resolution.defects.is_empty());

    let pet = doc.component_schema("Pet").unwrap();
    let used = doc
        .resolve(&ptr(
            "/paths/~1pets/get/responses/200/content/application~1json/schema",
        ))
        .unwrap();
    assert_eq!(used, pet, "alias chains collapse to the final definition");

    let parent = doc
        .resolve(&ptr("/components/schemas/Pet/properties/parent"))
        .unwrap();
    assert_eq!(parent, pet, "self references close the loop");
}

#[test]
fn alias_entries_keep_their_marker() {
    let mut doc = unresolved(ALIASES);
    resolve_references(&mut doc);
    let animal = doc.component_schema("Animal").unwrap();
    assert_eq!(
        doc.node(animal).reference(),
        Some("#/components/schemas/Pet")
    );
    assert_eq!(
        follow(&doc, animal),
        Target::Concrete(doc.component_schema("Pet").unwrap())
    );
}

#[test]
fn resolution_is_idempotent() {
    let mut doc = unresolved(ALIASES);
    resolve_references(&mut doc);
    let first = ReverseIndex::build(&doc);
    let first_entries: Vec<_> = first.entries().map(|(id, p)| (id, p.clone())).collect();

    let again = resolve_references(&mut doc);
    assert_eq!(again.rewritten, 0);
    let second = ReverseIndex::build(&doc);
    let second_entries: Vec<_> = second.entries().map(|(id, p)| (id, p.clone())).collect();
    assert_eq!(first.len(), second.len());
    assert_eq!(first_entries, second_entries);
}

#[test]
fn dangling_references_stay_terminal() {
    let yaml = r##"
openapi: 3.0.0
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Holder:
      type: object
      properties:
        missing:
          $ref: "#/components/schemas/Missing"
        remote:
          $ref: "other.yaml#/components/schemas/Pet"
"##;
    let mut doc = unresolved(yaml);
    let resolution = resolve_references(&mut doc);
    assert_eq!(resolution.rewritten, 0);
    assert_eq!(
        resolution.dangling,
        [
            "#/components/schemas/Missing",
            "other.yaml#/components/schemas/Pet"
        ]
    );

    let missing = doc
        .resolve(&ptr("/components/schemas/Holder/properties/missing"))
        .unwrap();
    assert_eq!(
        follow(&doc, missing),
        Target::Dangling("#/components/schemas/Missing".to_string())
    );
}

#[test]
fn reference_to_wrong_kind_is_a_defect() {
    let yaml = r##"
openapi: 3.0.0
info: {title: t, version: "1"}
paths:
  /a:
    get:
      parameters:
        - $ref: "#/components/schemas/Pet"
      responses: {}
components:
  schemas:
    Pet:
      type: object
"##;
    let mut doc = unresolved(yaml);
    let resolution = resolve_references(&mut doc);
    assert_eq!(resolution.defects.len(), 1);
    assert!(resolution.defects[0].contains("parameter"));
    let marker = doc.resolve(&ptr("/paths/~1a/get/parameters/0")).unwrap();
    assert_eq!(
        doc.node(marker).reference(),
        Some("#/components/schemas/Pet"),
        "defective markers are left in place"
    );
}

#[test]
fn reference_cycle_is_a_defect() {
    let yaml = r##"
openapi: 3.0.0
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    A:
      $ref: "#/components/schemas/B"
    B:
      $ref: "#/components/schemas/A"
"##;
    let mut doc = unresolved(yaml);
    let resolution = resolve_references(&mut doc);
    assert_eq!(resolution.defects.len(), 2);
    assert!(resolution.defects.iter().all(|d| d.contains("cycle")));
    let a = doc.component_schema("A").unwrap();
    assert!(matches!(follow(&doc, a), Target::Defect(_)));
}

#[test]
fn blank_component_names_are_backfilled() {
    let yaml = r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Pet:
      type: object
  parameters:
    Limit:
      name: limit
      in: query
    Offset:
      in: query
"#;
    let mut doc = unresolved(yaml);
    assert_eq!(backfill_names(&mut doc), 2);

    let pet = doc.component_schema("Pet").unwrap();
    assert_eq!(doc.schema(pet).unwrap().name.as_deref(), Some("Pet"));

    let params = &doc.components().unwrap().parameters;
    let names: Vec<_> = params
        .iter()
        .map(|(_, id)| doc.node(*id).as_parameter().unwrap().name.clone())
        .collect();
    assert_eq!(
        names,
        [Some("limit".to_string()), Some("Offset".to_string())]
    );
}

#[test]
fn context_construction_resolves_and_backfills() {
    let ctx = open(ALIASES);
    assert!(ctx.resolution().rewritten >= 3);
    let pet = ctx.document().component_schema("Pet").unwrap();
    assert_eq!(
        ctx.document().schema(pet).unwrap().name.as_deref(),
        Some("Pet")
    );
}
