//! Normalization of heterogeneous inference response shapes.
//!
//! Hosted text-generation endpoints disagree on their response envelope
//! depending on the model task. All known shapes collapse into plain text
//! here so the rest of the pipeline never touches raw JSON.

use super::types::{InferenceError, body_snippet};
use serde_json::Value;

/// Extract generated text from a parsed inference response body.
///
/// Accepted shapes, in the order they are probed:
/// - a list of objects each carrying `generated_text` or `summary_text`
///   (fragments joined with newlines),
/// - a single object carrying `generated_text` or `summary_text`,
/// - a bare string,
/// - a list of bare strings (joined with newlines).
///
/// Anything else is an [`InferenceError::UnrecognizedSchema`].
pub fn extract_generated_text(value: &Value) -> Result<String, InferenceError> {
    match value {
        Value::String(text) => Ok(text.clone()),
        Value::Object(_) => text_field(value)
            .map(str::to_string)
            .ok_or_else(|| unrecognized(value)),
        Value::Array(items) if !items.is_empty() => {
            let mut fragments = Vec::with_capacity(items.len());
            for item in items {
                let fragment = match item {
                    Value::String(text) => Some(text.as_str()),
                    Value::Object(_) => text_field(item),
                    _ => None,
                };
                match fragment {
                    Some(text) => fragments.push(text),
                    None => return Err(unrecognized(value)),
                }
            }
            Ok(fragments.join("\n"))
        }
        _ => Err(unrecognized(value)),
    }
}

fn text_field(value: &Value) -> Option<&str> {
    value
        .get("generated_text")
        .or_else(|| value.get("summary_text"))
        .and_then(Value::as_str)
}

fn unrecognized(value: &Value) -> InferenceError {
    InferenceError::UnrecognizedSchema(body_snippet(&value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_from_object_list() {
        let value = json!([{"generated_text": "X"}]);
        assert_eq!(extract_generated_text(&value).unwrap(), "X");
    }

    #[test]
    fn extracts_from_single_object() {
        let value = json!({"generated_text": "Y"});
        assert_eq!(extract_generated_text(&value).unwrap(), "Y");
    }

    #[test]
    fn extracts_from_bare_string_and_string_list() {
        assert_eq!(extract_generated_text(&json!("Z")).unwrap(), "Z");
        assert_eq!(extract_generated_text(&json!(["Z"])).unwrap(), "Z");
    }

    #[test]
    fn joins_multiple_fragments_in_order() {
        let value = json!([
            {"generated_text": "first"},
            {"summary_text": "second"}
        ]);
        assert_eq!(extract_generated_text(&value).unwrap(), "first\nsecond");
    }

    #[test]
    fn summary_text_is_accepted() {
        let value = json!([{"summary_text": "condensed"}]);
        assert_eq!(extract_generated_text(&value).unwrap(), "condensed");
    }

    #[test]
    fn unknown_shapes_are_rejected() {
        for value in [
            json!({"unexpected": 1}),
            json!(42),
            json!([]),
            json!([{"generated_text": "ok"}, {"other": true}]),
            json!(null),
        ] {
            let error = extract_generated_text(&value).unwrap_err();
            assert!(
                matches!(error, InferenceError::UnrecognizedSchema(_)),
                "expected UnrecognizedSchema for {value}"
            );
        }
    }
}
