//! Structured validation violations.
//!
//! The validation engine reports failures in a generic vocabulary: JSON
//! pointer paths, keyword names, schema fragments. This module adapts that
//! stream into a closed, CLI-oriented vocabulary the formatter can match
//! exhaustively, so no violation kind is ever dropped silently.

use jsonschema::Validator;
use jsonschema::error::ValidationErrorKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::tokenizer::POSITIONAL_KEY;

/// Closed set of violation kinds the formatter knows how to render.
///
/// Anything the engine reports outside the known set lands in [`Other`] with
/// its raw keyword, so new engine keywords degrade to the generic message
/// instead of disappearing.
///
/// [`Other`]: ViolationKind::Other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationKind {
    /// A property not declared in the schema, with unknowns disallowed
    AdditionalProperties,

    /// A value that does not match its declared scalar type
    Type,

    /// A value that matches none of the declared `anyOf` alternatives
    AnyOf,

    /// Positional bucket elements that fail the per-element schema
    Items,

    /// Any other engine keyword, kept verbatim
    Other(String),
}

impl ViolationKind {
    /// The engine-level keyword name for this kind.
    pub fn name(&self) -> &str {
        match self {
            Self::AdditionalProperties => "additionalProperties",
            Self::Type => "type",
            Self::AnyOf => "anyOf",
            Self::Items => "items",
            Self::Other(keyword) => keyword,
        }
    }
}

/// One structured record per schema mismatch, in engine emission order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Violated property name, or `_` for the positional bucket
    pub property: String,

    /// Classified error kind
    pub kind: ViolationKind,

    /// The implicated value as the validator saw it (possibly coerced)
    pub value: Value,

    /// The schema fragment that was violated
    pub subschema: Value,

    /// The engine's own message, used only as a last-resort fallback
    pub message: String,
}

/// Failed parse outcome: the rendered diagnostic plus the raw violations
/// for programmatic inspection.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ValidationFailure {
    /// One line per violation, newline-joined, engine order
    pub message: String,

    /// The structured violations behind the message
    pub violations: Vec<Violation>,
}

/// Run the compiled validator over a tokenized candidate and adapt every
/// engine error into a [`Violation`].
///
/// Three normalizations happen here:
/// - `additionalProperties` errors fan out into one violation per unexpected
///   property, since each unknown flag gets its own diagnostic line;
/// - errors anywhere inside the positional bucket collapse into a single
///   `Items` violation carrying the whole bucket value and sub-schema, since
///   the formatter recomputes the offending elements itself;
/// - every other error is classified by the violated keyword, the last
///   segment of its schema path.
pub(crate) fn collect_violations(
    validator: &Validator,
    schema: &Value,
    candidate: &Value,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut bucket_reported = false;

    for error in validator.iter_errors(candidate) {
        let instance_segments = pointer_segments(&error.instance_path.to_string());
        let mut schema_segments = pointer_segments(&error.schema_path.to_string());
        let keyword = schema_segments.pop().unwrap_or_default();

        if instance_segments.first().map(String::as_str) == Some(POSITIONAL_KEY) {
            let element_level = instance_segments.len() > 1;
            if element_level || keyword == "items" || keyword == "additionalItems" {
                if bucket_reported {
                    continue;
                }
                bucket_reported = true;
                violations.push(Violation {
                    property: POSITIONAL_KEY.to_string(),
                    kind: ViolationKind::Items,
                    value: candidate.get(POSITIONAL_KEY).cloned().unwrap_or(Value::Null),
                    subschema: positional_schema(schema),
                    message: error.to_string(),
                });
            } else {
                violations.push(Violation {
                    property: POSITIONAL_KEY.to_string(),
                    kind: ViolationKind::Other(keyword),
                    value: error.instance.clone().into_owned(),
                    subschema: resolve_fragment(schema, &schema_segments),
                    message: error.to_string(),
                });
            }
            continue;
        }

        if let ValidationErrorKind::AdditionalProperties { unexpected } = &error.kind {
            for name in unexpected {
                violations.push(Violation {
                    property: name.clone(),
                    kind: ViolationKind::AdditionalProperties,
                    value: Value::String(name.clone()),
                    subschema: Value::Bool(false),
                    message: error.to_string(),
                });
            }
            continue;
        }

        let kind = match keyword.as_str() {
            "type" => ViolationKind::Type,
            "anyOf" => ViolationKind::AnyOf,
            // Reached only if the engine reports unexpected properties
            // per-property instead of through the fanned-out kind above
            "additionalProperties" => ViolationKind::AdditionalProperties,
            _ => ViolationKind::Other(keyword),
        };
        violations.push(Violation {
            property: instance_segments.first().cloned().unwrap_or_default(),
            kind,
            value: error.instance.clone().into_owned(),
            subschema: resolve_fragment(schema, &schema_segments),
            message: error.to_string(),
        });
    }

    violations
}

/// The positional bucket's declared schema, if any.
fn positional_schema(schema: &Value) -> Value {
    schema
        .get("properties")
        .and_then(|properties| properties.get(POSITIONAL_KEY))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Split a JSON pointer into unescaped segments.
fn pointer_segments(pointer: &str) -> Vec<String> {
    pointer
        .split('/')
        .skip(1)
        .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Walk pointer segments through a schema value, indexing arrays by number.
fn resolve_fragment(schema: &Value, segments: &[String]) -> Value {
    let mut current = schema;
    for segment in segments {
        let next = match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => current.get(segment.as_str()),
        };
        match next {
            Some(value) => current = value,
            None => return Value::Null,
        }
    }
    current.clone()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_and_unescapes_pointers() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(pointer_segments("/a/0"), vec!["a", "0"]);
        assert_eq!(pointer_segments("/a~1b/c~0d"), vec!["a/b", "c~d"]);
    }

    #[test]
    fn resolves_fragments_through_objects_and_arrays() {
        let schema = json!({
            "properties": { "a": { "anyOf": [{ "type": "number" }] } }
        });
        let segments: Vec<String> =
            ["properties", "a", "anyOf", "0"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolve_fragment(&schema, &segments), json!({ "type": "number" }));

        let missing: Vec<String> = ["properties", "b"].iter().map(|s| s.to_string()).collect();
        assert_eq!(resolve_fragment(&schema, &missing), Value::Null);
    }
}
