//! Schema introspection for tokenizer configuration.
//!
//! This module inspects a schema's property definitions and classifies each
//! property by intended parse type. The tokenizer needs these hints *before*
//! validation runs: a value that should be numeric has to be coerced while it
//! is still a raw string, because validation cannot retroactively retype it.

use std::collections::BTreeSet;

use serde_json::Value;

/// Classification of a single schema property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyClass {
    /// A scalar property with a single declared type
    Scalar(ScalarKind),

    /// An array property together with its deduced element type
    Array(ScalarKind),

    /// No usable scalar type: a type list, an `anyOf`, or no type at all.
    /// The tokenizer treats these as strings and leaves type checking to the
    /// validator.
    Unclassified,
}

/// Scalar types the tokenizer can coerce to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Number,
    Boolean,
}

/// Key hints derived from a schema, consumed by the tokenizer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizerHints {
    /// Keys whose repeated occurrences collect into an array
    pub array_keys: BTreeSet<String>,

    /// Keys whose values are coerced to numbers
    pub number_keys: BTreeSet<String>,

    /// Keys parsed as presence/absence booleans
    pub boolean_keys: BTreeSet<String>,
}

/// Classify every property of `schema` into tokenizer key hints.
///
/// Array properties contribute to `array_keys` and, when their element type
/// deduces to number or boolean, to the matching coercion set as well so that
/// each collected value is coerced individually.
pub fn classify(schema: &Value) -> TokenizerHints {
    let mut hints = TokenizerHints::default();

    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return hints;
    };

    for (name, property) in properties {
        match classify_property(property) {
            PropertyClass::Array(element) => {
                hints.array_keys.insert(name.clone());
                match element {
                    ScalarKind::Number => {
                        hints.number_keys.insert(name.clone());
                    }
                    ScalarKind::Boolean => {
                        hints.boolean_keys.insert(name.clone());
                    }
                    ScalarKind::String => {}
                }
            }
            PropertyClass::Scalar(ScalarKind::Number) => {
                hints.number_keys.insert(name.clone());
            }
            PropertyClass::Scalar(ScalarKind::Boolean) => {
                hints.boolean_keys.insert(name.clone());
            }
            PropertyClass::Scalar(ScalarKind::String) | PropertyClass::Unclassified => {}
        }
    }

    hints
}

/// Classify one property schema by its declared `type`.
pub fn classify_property(property: &Value) -> PropertyClass {
    match property.get("type").and_then(Value::as_str) {
        Some("array") => PropertyClass::Array(deduce_item_type(property.get("items"))),
        Some("string") => PropertyClass::Scalar(ScalarKind::String),
        // The validator still enforces integrality for "integer"
        Some("number") | Some("integer") => PropertyClass::Scalar(ScalarKind::Number),
        Some("boolean") => PropertyClass::Scalar(ScalarKind::Boolean),
        _ => PropertyClass::Unclassified,
    }
}

/// Deduce the element type of an array property from its `items` signature.
///
/// A single item schema contributes its scalar type. A per-position list
/// deduces number or boolean only when *every* listed schema shares that
/// exact type; anything mixed, empty, or absent defaults to string, the safe
/// choice that defers the mismatch to the validator.
pub fn deduce_item_type(items: Option<&Value>) -> ScalarKind {
    match items {
        Some(Value::Object(schema)) => match schema.get("type").and_then(Value::as_str) {
            Some("number") | Some("integer") => ScalarKind::Number,
            Some("boolean") => ScalarKind::Boolean,
            _ => ScalarKind::String,
        },
        Some(Value::Array(list)) if !list.is_empty() => {
            if list.iter().all(|item| item_has_type(item, "number")) {
                ScalarKind::Number
            } else if list.iter().all(|item| item_has_type(item, "boolean")) {
                ScalarKind::Boolean
            } else {
                ScalarKind::String
            }
        }
        _ => ScalarKind::String,
    }
}

fn item_has_type(item: &Value, expected: &str) -> bool {
    item.get("type").and_then(Value::as_str) == Some(expected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_scalar_properties() {
        let schema = json!({
            "properties": {
                "name": { "type": "string" },
                "count": { "type": "number" },
                "retries": { "type": "integer" },
                "verbose": { "type": "boolean" }
            }
        });

        let hints = classify(&schema);
        assert!(hints.array_keys.is_empty());
        assert!(hints.number_keys.contains("count"));
        assert!(hints.number_keys.contains("retries"));
        assert!(hints.boolean_keys.contains("verbose"));
        assert!(!hints.number_keys.contains("name"));
    }

    #[test]
    fn array_properties_inherit_element_coercion() {
        let schema = json!({
            "properties": {
                "port": { "type": "array", "items": { "type": "number" } },
                "tag": { "type": "array", "items": { "type": "string" } }
            }
        });

        let hints = classify(&schema);
        assert!(hints.array_keys.contains("port"));
        assert!(hints.number_keys.contains("port"));
        assert!(hints.array_keys.contains("tag"));
        assert!(!hints.number_keys.contains("tag"));
    }

    #[test]
    fn type_lists_and_any_of_stay_unclassified() {
        assert_eq!(
            classify_property(&json!({ "type": ["string", "number"] })),
            PropertyClass::Unclassified
        );
        assert_eq!(
            classify_property(&json!({ "anyOf": [{ "type": "number" }] })),
            PropertyClass::Unclassified
        );
    }

    #[test]
    fn tuple_items_deduce_only_uniform_types() {
        assert_eq!(
            deduce_item_type(Some(&json!([{ "type": "number" }, { "type": "number" }]))),
            ScalarKind::Number
        );
        assert_eq!(
            deduce_item_type(Some(&json!([{ "type": "boolean" }]))),
            ScalarKind::Boolean
        );
        assert_eq!(
            deduce_item_type(Some(&json!([{ "type": "number" }, { "type": "string" }]))),
            ScalarKind::String
        );
        assert_eq!(deduce_item_type(Some(&json!([]))), ScalarKind::String);
        assert_eq!(deduce_item_type(None), ScalarKind::String);
    }

    #[test]
    fn single_item_schema_without_scalar_type_defaults_to_string() {
        assert_eq!(
            deduce_item_type(Some(&json!({ "type": ["number", "string"] }))),
            ScalarKind::String
        );
        assert_eq!(deduce_item_type(Some(&json!({ "enum": [1, 2] }))), ScalarKind::String);
    }
}
