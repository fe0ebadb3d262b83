//! Human-readable rendering of validation violations.
//!
//! Violations arrive in the validator's vocabulary; users typed flags and
//! positionals. This module does the translation: it phrases every violation
//! in terms of `-x`/`--name` flags or positional arguments, recovers the raw
//! as-typed value when the validated one was already coerced, and pinpoints
//! exactly which positional elements were not allowed.

use jsonschema::Draft;
use serde_json::{Map, Value};

use crate::tokenizer::{POSITIONAL_KEY, TokenizerConfig, tokenize};
use crate::violation::{Violation, ViolationKind};

/// Render one line per violation, newline-joined, order preserved.
///
/// `raw_config` must be the parser's tokenizer configuration with numeric
/// coercion removed: the violations carry values as the validator saw them,
/// and the secondary tokenizer pass recovers what the user actually typed.
pub(crate) fn format_violations(
    violations: &[Violation],
    argv: &[String],
    raw_config: &TokenizerConfig,
) -> String {
    let raw = tokenize(argv, raw_config);
    violations
        .iter()
        .map(|violation| {
            if violation.property == POSITIONAL_KEY {
                positional_line(violation)
            } else {
                flag_line(violation, &raw)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn flag_line(violation: &Violation, raw: &Map<String, Value>) -> String {
    // Root-level violations carry no property name to phrase a flag around
    if violation.property.is_empty() {
        return fallback_line(violation);
    }
    let flag = dash_name(&violation.property);
    match &violation.kind {
        ViolationKind::AdditionalProperties => {
            format!("unknown flag {flag} is not allowed")
        }
        ViolationKind::Type => match expected_types(violation.subschema.get("type")) {
            Some(expected) => {
                let received = raw_value(violation, raw);
                format!(
                    "flag {flag} must be of type \"{expected}\", received {} of type \"{}\"",
                    json_literal(received),
                    value_kind(received)
                )
            }
            None => fallback_line(violation),
        },
        ViolationKind::AnyOf => match alternatives_summary(violation.subschema.get("anyOf")) {
            Some(summary) => {
                let received = raw_value(violation, raw);
                format!(
                    "flag {flag} must be any of \"{summary}\", received {} of type \"{}\"",
                    json_literal(received),
                    value_kind(received)
                )
            }
            None => fallback_line(violation),
        },
        ViolationKind::Items | ViolationKind::Other(_) => fallback_line(violation),
    }
}

fn positional_line(violation: &Violation) -> String {
    match (&violation.kind, violation.value.as_array()) {
        (ViolationKind::Items, Some(elements)) => {
            let offending = offending_elements(elements, &violation.subschema);
            match offending.as_slice() {
                [] => fallback_line(violation),
                [element] => {
                    format!("unknown positional \"{}\" is not allowed", display(element))
                }
                several => {
                    let joined =
                        several.iter().map(display).collect::<Vec<_>>().join(", ");
                    format!("unknown positionals \"{joined}\" are not allowed")
                }
            }
        }
        _ => fallback_line(violation),
    }
}

/// Generic template for anything outside the known taxonomy. Total by
/// construction: every violation renders exactly one line.
fn fallback_line(violation: &Violation) -> String {
    format!(
        "unknown validation error \"{}\": {}",
        violation.kind.name(),
        violation.message
    )
}

/// Recompute which positional elements independently fail the per-element
/// schema. The validator's own report does not enumerate offenders when a
/// single templated element type repeats, and trailing-count errors would
/// miss interior invalid elements, so each element is re-validated alone.
fn offending_elements(elements: &[Value], bucket_schema: &Value) -> Vec<Value> {
    let items = bucket_schema.get("items");
    let additional = bucket_schema.get("additionalItems");

    // Single-schema form: one template for every element
    if let Some(template @ Value::Object(_)) = items {
        let Some(validator) = compile_template(template) else {
            return Vec::new();
        };
        return elements
            .iter()
            .filter(|element| !validator.is_valid(element))
            .cloned()
            .collect();
    }

    // Tuple form: positional templates, then the additionalItems rule
    if let Some(Value::Array(templates)) = items {
        return elements
            .iter()
            .enumerate()
            .filter(|(index, element)| match templates.get(*index) {
                Some(template) => fails_template(template, element),
                None => match additional {
                    Some(Value::Bool(false)) => true,
                    Some(template @ Value::Object(_)) => fails_template(template, element),
                    _ => false,
                },
            })
            .map(|(_, element)| element.clone())
            .collect();
    }

    Vec::new()
}

fn fails_template(template: &Value, element: &Value) -> bool {
    compile_template(template)
        .map(|validator| !validator.is_valid(element))
        .unwrap_or(false)
}

/// Same draft as the main validator, so element templates keep the array
/// vocabulary the bucket schema was written in.
fn compile_template(template: &Value) -> Option<jsonschema::Validator> {
    jsonschema::options().with_draft(Draft::Draft7).build(template).ok()
}

/// The value as the user typed it, recovered from the coercion-free pass;
/// falls back to the validated value when the flag is absent from the raw
/// map (defaults, nested paths).
fn raw_value<'a>(violation: &'a Violation, raw: &'a Map<String, Value>) -> &'a Value {
    raw.get(&violation.property).unwrap_or(&violation.value)
}

/// `-x` for one-character flags, `--name` otherwise.
fn dash_name(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// Literal form for expected-value listings and positional joins: strings
/// bare, everything else compact JSON.
fn display(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// JSON-literal form for received values: strings stay quoted.
fn json_literal(value: &Value) -> String {
    value.to_string()
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Declared type name(s) of a sub-schema: a single name or a comma-joined
/// list, `None` when the fragment has no usable `type`.
fn expected_types(declared: Option<&Value>) -> Option<String> {
    match declared {
        Some(Value::String(name)) => Some(name.clone()),
        Some(Value::Array(names)) if !names.is_empty() => {
            Some(names.iter().map(display).collect::<Vec<_>>().join(", "))
        }
        _ => None,
    }
}

/// Acceptable-value summary for an `anyOf`: the union over alternatives of
/// their enum literals, else their declared type name(s), declaration order.
/// Alternatives with neither contribute nothing; `None` when nothing at all
/// contributes.
fn alternatives_summary(alternatives: Option<&Value>) -> Option<String> {
    let alternatives = alternatives?.as_array()?;
    let mut parts: Vec<String> = Vec::new();

    for alternative in alternatives {
        if let Some(options) = alternative.get("enum").and_then(Value::as_array) {
            parts.extend(options.iter().map(display));
        } else if let Some(types) = expected_types(alternative.get("type")) {
            parts.push(types);
        }
    }

    if parts.is_empty() { None } else { Some(parts.join(", ")) }
}
