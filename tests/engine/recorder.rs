use super::common::*;
use oaslint::recorder::Recorder;

#[test]
fn violation_here_defaults_to_last_touched_node() {
    let ctx = open(PETSTORE);
    let api = ctx.api();
    let servers = api.servers();
    let url = &servers[1].node().as_server().unwrap().url;
    assert_eq!(url, "api.example.com/v2");
    let v = ctx.violation_here("server");
    assert_eq!(v.pointer, Some(ptr("/servers/1")));
}

#[test]
fn listing_records_the_container() {
    let ctx = open(PETSTORE);
    let paths = ctx.api().paths();
    assert_eq!(paths.len(), 2);
    assert_eq!(ctx.current_pointer(), ptr("/paths"));
}

#[test]
fn nested_navigation_keeps_only_latest_access() {
    let ctx = open(PETSTORE);
    let api = ctx.api();
    let (_, item) = api
        .paths()
        .into_iter()
        .find(|(path, _)| *path == "/pets")
        .unwrap();
    let (_, get) = item.operations().into_iter().next().unwrap();
    let responses = get.responses();
    let (_, ok) = &responses[0];
    let (_, media) = ok.content().into_iter().next().unwrap();
    let _schema = media.schema().unwrap();
    assert_eq!(
        ctx.current_pointer(),
        ptr("/paths/~1pets/get/responses/200/content/application~1json/schema")
    );
}

#[test]
fn extension_reads_do_not_touch_the_trace() {
    let ctx = open(PETSTORE);
    let api = ctx.api();
    let info = api.info().unwrap();
    assert_eq!(ctx.current_pointer(), ptr("/info"));
    let audience = info.extension("x-audience");
    assert_eq!(audience, Some(serde_json::json!("external")));
    assert_eq!(info.extensions().len(), 1);
    assert_eq!(ctx.violation_here("info").pointer, Some(ptr("/info")));
}

#[test]
fn api_starts_a_fresh_scope() {
    let ctx = open(PETSTORE);
    ctx.api().servers()[0].touch();
    assert_eq!(ctx.current_pointer(), ptr("/servers/0"));
    let _api = ctx.api();
    assert_eq!(ctx.current_pointer(), ptr(""));
    assert_eq!(ctx.violation_here("root").pointer, Some(ptr("")));
}

#[test]
fn missing_pointer_falls_back_to_trace() {
    let ctx = open(PETSTORE);
    let api = ctx.api();
    let _schemas = api.components().unwrap().schemas();
    let v = ctx.violation("fallback", None::<oaslint::Pointer>);
    assert_eq!(v.pointer, Some(ptr("/components/schemas")));
}

#[test]
fn tracked_handle_locates_itself_regardless_of_trace() {
    let ctx = open(PETSTORE);
    let api = ctx.api();
    let first = api.servers().into_iter().next().unwrap();
    let _info = api.info();
    let v = ctx.violation("server", &first);
    assert_eq!(v.pointer, Some(ptr("/servers/0")));
}

#[test]
fn generic_child_navigates_untyped_nodes() {
    let yaml = r#"
openapi: 3.0.0
info:
  title: t
  version: "1"
  x-team:
    owners: [alice, bob]
paths: {}
"#;
    let ctx = open(yaml);
    let api = ctx.api();
    let info = api.info().unwrap();
    let team = info.field("x-team");
    assert!(team.is_none(), "extensions are not reachable as fields");
    assert_eq!(
        info.extension("x-team"),
        Some(serde_json::json!({"owners": ["alice", "bob"]}))
    );
}

#[test]
fn recorder_reset_and_record() {
    let recorder = Recorder::new();
    recorder.record(&ptr("/a/b"));
    assert_eq!(recorder.pointer(), ptr("/a/b"));
    recorder.reset();
    assert!(recorder.pointer().is_root());
}

#[test]
fn additional_properties_are_tracked() {
    let yaml = r#"
openapi: 3.0.0
info: {title: t, version: "1"}
paths: {}
components:
  schemas:
    Typed:
      type: object
      additionalProperties:
        type: string
    Named:
      type: object
      additionalProperties:
        first:
          type: string
        second:
          type: integer
"#;
    let ctx = open(yaml);
    let api = ctx.api();
    let schemas = api.components().unwrap().schemas();
    let typed = schemas[0].1.additional_properties();
    assert_eq!(typed.len(), 1);
    assert_eq!(typed[0].0, None);
    assert_eq!(
        ctx.current_pointer(),
        ptr("/components/schemas/Typed/additionalProperties")
    );
    let named = schemas[1].1.additional_properties();
    let keys: Vec<_> = named.iter().map(|(k, _)| *k).collect();
    assert_eq!(keys, [Some("first"), Some("second")]);
    named[1].1.touch();
    assert_eq!(
        ctx.current_pointer(),
        ptr("/components/schemas/Named/additionalProperties/second")
    );
}
