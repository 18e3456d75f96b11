use crate::convert::is_swagger;
use crate::error::{ParseError, ParseErrorKind};
use serde_json::Value;

/// Source dialect of a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    /// OpenAPI 3.x, the canonical dialect.
    OpenApi,
    /// Swagger 2.0, converted before linting.
    Swagger,
}

/// A deserialized document and the dialect detected from its root key.
#[derive(Clone, Debug)]
pub struct Parsed {
    pub dialect: Dialect,
    pub value: Value,
}

/// Parse JSON or YAML text into a value and detect its dialect.
///
/// Performs deserialization and dialect detection only. The typed tree is
/// built afterwards, so structurally odd documents still parse.
pub fn parse(input: &str) -> Result<Parsed, ParseError> {
    let value = parse_value(input)?;
    let dialect = detect(&value)?;
    Ok(Parsed { dialect, value })
}

/// Parse text that must be in `expected` dialect.
pub fn parse_as(input: &str, expected: Dialect) -> Result<Parsed, ParseError> {
    let parsed = parse(input)?;
    if parsed.dialect != expected {
        return Err(ParseError::new(
            ParseErrorKind::UnsupportedDialect,
            format!("expected a {:?} document, found {:?}", expected, parsed.dialect),
        ));
    }
    Ok(parsed)
}

/// Deserialize text into a mapping-rooted value.
pub fn parse_value(input: &str) -> Result<Value, ParseError> {
    if input.trim().is_empty() {
        return Err(ParseError::new(ParseErrorKind::Syntax, "empty input"));
    }

    check_multi_document(input)?;

    // JSON is a YAML subset, so one deserializer covers both formats.
    let value: Value = serde_saphyr::from_str(input).map_err(|e| {
        let msg = e.to_string();
        ParseError::new(classify_saphyr_error(&msg), msg)
    })?;

    if !value.is_object() {
        return Err(ParseError::new(
            ParseErrorKind::TypeMismatch,
            "document root must be a mapping",
        ));
    }
    Ok(value)
}

fn detect(value: &Value) -> Result<Dialect, ParseError> {
    if is_swagger(value) {
        return Ok(Dialect::Swagger);
    }
    match value.get("openapi") {
        Some(Value::String(version)) if version.starts_with("3.") => Ok(Dialect::OpenApi),
        Some(Value::Number(n)) if n.as_f64().is_some_and(|v| (3.0..4.0).contains(&v)) => {
            Ok(Dialect::OpenApi)
        }
        Some(other) => Err(ParseError {
            kind: ParseErrorKind::UnsupportedDialect,
            message: format!("unsupported openapi version: {}", other),
            path: Some("openapi".to_string()),
        }),
        None if value.get("swagger").is_some() => Err(ParseError {
            kind: ParseErrorKind::UnsupportedDialect,
            message: "unsupported swagger version".to_string(),
            path: Some("swagger".to_string()),
        }),
        None => Err(ParseError::new(
            ParseErrorKind::UnsupportedDialect,
            "document has neither an 'openapi' nor a 'swagger' version field",
        )),
    }
}

/// Check for multiple YAML documents (--- separator).
/// Only matches `---` at column 0 to avoid false positives inside block scalars.
fn check_multi_document(input: &str) -> Result<(), ParseError> {
    let markers = input
        .lines()
        .filter(|line| line.starts_with("---") && line[3..].trim().is_empty())
        .count();
    if markers > 1 {
        return Err(ParseError::new(
            ParseErrorKind::Syntax,
            "multi-document YAML is not supported",
        ));
    }
    Ok(())
}

fn classify_saphyr_error(msg: &str) -> ParseErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("invalid type") || lower.contains("expected") {
        ParseErrorKind::TypeMismatch
    } else {
        ParseErrorKind::Syntax
    }
}
