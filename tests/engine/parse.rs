use oaslint::parse::{Dialect, parse, parse_as, parse_value};
use oaslint::{Context, ParseErrorKind};

#[test]
fn empty_input_is_a_syntax_error() {
    let err = parse("   \n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
}

#[test]
fn multi_document_yaml_is_rejected() {
    let input = "---\nopenapi: 3.0.0\n---\nopenapi: 3.0.0\n";
    let err = parse(input).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert!(err.message.contains("multi-document"));
}

#[test]
fn single_document_marker_is_allowed() {
    let input = "---\nopenapi: 3.0.0\ninfo: {title: t, version: \"1\"}\npaths: {}\n";
    assert_eq!(parse(input).unwrap().dialect, Dialect::OpenApi);
}

#[test]
fn root_must_be_a_mapping() {
    let err = parse_value("- a\n- b\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::TypeMismatch);
}

#[test]
fn swagger_version_may_be_a_number() {
    let parsed = parse("swagger: 2.0\ninfo: {title: t, version: \"1\"}\npaths: {}\n").unwrap();
    assert_eq!(parsed.dialect, Dialect::Swagger);
}

#[test]
fn openapi_31_is_canonical() {
    let parsed = parse("openapi: 3.1.0\ninfo: {title: t, version: \"1\"}\n").unwrap();
    assert_eq!(parsed.dialect, Dialect::OpenApi);
}

#[test]
fn unknown_versions_are_unsupported() {
    for input in [
        "openapi: 2.0.0\npaths: {}\n",
        "swagger: \"1.2\"\npaths: {}\n",
        "info: {title: t}\npaths: {}\n",
    ] {
        let err = parse(input).unwrap_err();
        assert_eq!(
            err.kind,
            ParseErrorKind::UnsupportedDialect,
            "input {:?} gave {:?}",
            input,
            err
        );
    }
}

#[test]
fn parse_as_rejects_other_dialect() {
    let err = parse_as("openapi: 3.0.0\npaths: {}\n", Dialect::Swagger).unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnsupportedDialect);
    let err = Context::try_swagger("openapi: 3.0.0\npaths: {}\n").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnsupportedDialect);
}

#[test]
fn malformed_yaml_reports_an_error() {
    let err = parse("openapi: 3.0.0\npaths: {unclosed\n").unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::Syntax | ParseErrorKind::TypeMismatch
    ));
    assert!(!err.message.is_empty());
}

#[test]
fn mistyped_fields_do_not_fail_the_document() {
    let yaml = r#"
openapi: 3.0.0
info: a string instead of a mapping
servers: not-a-list
paths:
  /a:
    get:
      tags: nope
      responses: {}
"#;
    let ctx = Context::try_open_api(yaml).expect("lenient build");
    assert!(ctx.document().root().info.is_none());
    assert!(ctx.document().root().servers.is_empty());
    assert_eq!(ctx.document().operations().len(), 1);
}
