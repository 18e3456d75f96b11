//! [`Report`] → JSON / YAML rendering.

use crate::error::SerializeError;
use crate::executor::Report;

/// Serialize a report as pretty-printed JSON.
pub fn to_json(report: &Report) -> Result<String, SerializeError> {
    serde_json::to_string_pretty(report).map_err(|e| SerializeError {
        message: format!("failed to serialize report to JSON: {}", e),
    })
}

/// Serialize a report as YAML.
///
/// Goes through `serde_json::Value` so field order matches the JSON form.
pub fn to_yaml(report: &Report) -> Result<String, SerializeError> {
    let value = serde_json::to_value(report).map_err(|e| SerializeError {
        message: format!("failed to convert report to JSON value: {}", e),
    })?;

    serde_saphyr::to_string(&value).map_err(|e| SerializeError {
        message: format!("failed to serialize report to YAML: {}", e),
    })
}
