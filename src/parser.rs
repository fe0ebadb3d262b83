//! Parser construction and parse-then-validate orchestration.
//!
//! A [`Parser`] is built once from a schema: the schema is normalized, the
//! tokenizer configuration is derived from it, and the validator is compiled.
//! Each `parse` call then runs tokenizer and validator over one argument
//! vector and wraps the outcome in a success/failure result.

use jsonschema::{Draft, Validator};
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::{Error, Result};
use crate::format::format_violations;
use crate::introspect::classify;
use crate::tokenizer::{POSITIONAL_KEY, TokenizerConfig, tokenize};
use crate::violation::{ValidationFailure, collect_violations};

/// Options accepted by [`configure`].
#[derive(Debug, Clone, Default)]
pub struct ParserOptions {
    /// Schema to validate against; absent behaves as the permissive `{}`
    pub schema: Option<Value>,
}

/// Build a parser for the given options.
///
/// # Arguments
/// * `options` - Parser options, usually just the schema
///
/// # Returns
/// * A compiled [`Parser`], or [`Error::InvalidSchema`] when the validation
///   engine rejects the schema
pub fn configure(options: ParserOptions) -> Result<Parser> {
    Parser::new(options.schema.unwrap_or_else(|| json!({})))
}

/// A compiled argument parser.
///
/// Holds the normalized schema, the derived tokenizer configuration, and the
/// compiled validator. Immutable after construction, so a single parser can
/// be shared across threads and reused for any number of `parse` calls.
pub struct Parser {
    schema: Value,
    validator: Validator,
    config: TokenizerConfig,
    raw_config: TokenizerConfig,
}

impl Parser {
    /// Compile a parser directly from a schema value.
    pub fn new(schema: Value) -> Result<Self> {
        let schema = normalize_schema(schema);
        // Draft 7: the positional bucket relies on array-form `items` with
        // `additionalItems`, which later drafts renamed away.
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .build(&schema)
            .map_err(|error| Error::InvalidSchema(error.to_string()))?;

        let hints = classify(&schema);
        debug!(?hints, "derived tokenizer configuration");

        // Coercion is fully schema-driven: the tokenizer never guesses
        // numbers and never splits dotted keys on its own.
        let config = TokenizerConfig {
            array_keys: hints.array_keys,
            number_keys: hints.number_keys,
            boolean_keys: hints.boolean_keys,
            parse_numbers: false,
            split_dotted_keys: false,
        };

        // Secondary configuration for diagnostics: identical token
        // consumption, but values keep their as-typed string form.
        let mut raw_config = config.clone();
        raw_config.number_keys.clear();

        Ok(Self { schema, validator, config, raw_config })
    }

    /// The normalized schema this parser validates against.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// Parse and validate an argument vector.
    ///
    /// Tokenization cannot fail; unknown flags pass through to validation.
    /// On success the parsed object is returned unchanged, with the `_` key
    /// holding the ordered positionals. On failure the returned
    /// [`ValidationFailure`] carries one diagnostic line per violation plus
    /// the structured violations themselves. Deterministic for a given
    /// `(schema, argv)` pair.
    pub fn parse(&self, argv: &[String]) -> std::result::Result<Value, ValidationFailure> {
        let candidate = Value::Object(tokenize(argv, &self.config));
        let violations = collect_violations(&self.validator, &self.schema, &candidate);

        if violations.is_empty() {
            return Ok(candidate);
        }

        debug!(count = violations.len(), "argument validation failed");
        let message = format_violations(&violations, argv, &self.raw_config);
        Err(ValidationFailure { message, violations })
    }
}

/// Normalize a schema before compilation.
///
/// When unknown properties are rejected and no positional constraint exists,
/// positionals are forbidden too: `additionalProperties: false` alone says
/// nothing about the `_` bucket, so one is synthesized that allows no
/// elements. An explicit `_` schema is never overridden.
fn normalize_schema(mut schema: Value) -> Value {
    if schema.get("additionalProperties") != Some(&Value::Bool(false)) {
        return schema;
    }
    let Some(root) = schema.as_object_mut() else {
        return schema;
    };

    let properties = root
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Some(properties) = properties.as_object_mut() {
        properties
            .entry(POSITIONAL_KEY)
            .or_insert_with(|| json!({ "type": "array", "items": [], "additionalItems": false }));
    }

    schema
}
