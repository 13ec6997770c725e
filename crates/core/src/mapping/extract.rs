use serde_json::Value;
use thiserror::Error;

use crate::scan::FieldMapping;

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("response contains no JSON object")]
    NoJson,

    #[error("invalid JSON in mapping response: {0}")]
    InvalidJson(String),

    #[error("mapping value for label {0:?} is not a scalar")]
    NonScalarValue(String),
}

/// Recover the label-to-value mapping from a raw model response.
///
/// The provider contract asks for a bare JSON object, but models wrap
/// output in markdown fences or commentary often enough that this parses
/// defensively: fences are stripped, then the outermost `{...}` region is
/// decoded. Scalar values are coerced to strings (`null` becomes the empty
/// string); array or object values are rejected.
pub fn extract_mapping(response: &str) -> Result<FieldMapping, MappingError> {
    let mut text = response.trim();

    // Remove opening fence: ```json or ```
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest.trim_start_matches('\n');
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest.trim_start_matches('\n');
    }

    // Remove closing fence
    if let Some(rest) = text.strip_suffix("```") {
        text = rest.trim_end_matches('\n');
    }

    let start = text.find('{').ok_or(MappingError::NoJson)?;
    let end = text.rfind('}').ok_or(MappingError::NoJson)?;
    if end < start {
        return Err(MappingError::NoJson);
    }

    let value: Value = serde_json::from_str(&text[start..=end])
        .map_err(|e| MappingError::InvalidJson(e.to_string()))?;
    let object = match value {
        Value::Object(object) => object,
        // Unreachable given the brace search above, but kept explicit.
        _ => return Err(MappingError::NoJson),
    };

    let mut mapping = FieldMapping::new();
    for (label, value) in object {
        let value = match value {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
            Value::Array(_) | Value::Object(_) => {
                return Err(MappingError::NonScalarValue(label))
            }
        };
        mapping.insert(label, value);
    }

    Ok(mapping)
}
