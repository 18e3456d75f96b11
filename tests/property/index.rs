use oaslint::Context;
use oaslint::build::build;
use proptest::prelude::*;
use serde_json::{Map, Value, json};

const COMPONENTS: usize = 3;

/// Schemas with awkward property names and the occasional local reference.
fn arb_schema() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(json!({"type": "string"})),
        Just(json!({"type": "integer"})),
        (0..COMPONENTS).prop_map(|i| json!({"$ref": format!("#/components/schemas/S{}", i)})),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        prop_oneof![
            prop::collection::vec(("[a-z/~]{1,6}", inner.clone()), 1..4).prop_map(|props| {
                let properties: Map<String, Value> = props.into_iter().collect();
                json!({"type": "object", "properties": properties})
            }),
            inner
                .clone()
                .prop_map(|items| json!({"type": "array", "items": items})),
            prop::collection::vec(inner, 1..3).prop_map(|parts| json!({"allOf": parts})),
        ]
    })
}

fn document(schemas: Vec<Value>, used: Value) -> Value {
    let components: Map<String, Value> = schemas
        .into_iter()
        .enumerate()
        .map(|(i, s)| (format!("S{}", i), s))
        .collect();
    json!({
        "openapi": "3.0.0",
        "info": {"title": "t", "version": "1"},
        "paths": {
            "/a/{id}": {
                "get": {
                    "responses": {
                        "200": {
                            "description": "ok",
                            "content": {"application/json": {"schema": used}}
                        }
                    }
                }
            }
        },
        "components": {"schemas": components}
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn every_indexed_pointer_resolves_to_its_node(
        schemas in prop::collection::vec(arb_schema(), COMPONENTS),
        used in arb_schema(),
    ) {
        let ctx = Context::from_document(build(&document(schemas, used)));
        for (id, pointer) in ctx.index().entries() {
            prop_assert_eq!(ctx.document().resolve(pointer), Some(id), "pointer {}", pointer);
        }
    }

    #[test]
    fn components_keep_their_home_pointer(
        schemas in prop::collection::vec(arb_schema(), COMPONENTS),
        used in arb_schema(),
    ) {
        let ctx = Context::from_document(build(&document(schemas, used)));
        let components = ctx.document().components().unwrap();
        for (name, id) in &components.schemas {
            let expected = format!("/components/schemas/{}", name);
            prop_assert_eq!(
                ctx.pointer_for(*id).map(|p| p.to_string()),
                Some(expected)
            );
        }
    }

    #[test]
    fn resolution_is_stable(
        schemas in prop::collection::vec(arb_schema(), COMPONENTS),
        used in arb_schema(),
    ) {
        let value = document(schemas, used);
        let first = Context::from_document(build(&value));
        let second = Context::from_document(build(&value));
        let a: Vec<_> = first.index().entries().map(|(id, p)| (id, p.clone())).collect();
        let b: Vec<_> = second.index().entries().map(|(id, p)| (id, p.clone())).collect();
        prop_assert_eq!(a, b);
    }
}
