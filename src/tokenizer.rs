//! CLI tokenizer: turns an argument vector into a flat key/value map.
//!
//! This module is the parsing collaborator consumed by the orchestrator. It
//! knows nothing about schemas; it only applies the key hints and behavior
//! flags in a [`TokenizerConfig`]. Tokenization itself cannot fail:
//! unrecognized flags pass through and end up in the map, and bare tokens
//! collect into the reserved `_` positional bucket.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Reserved key holding the ordered positional arguments.
pub const POSITIONAL_KEY: &str = "_";

/// Behavior hints for a single tokenizer run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// Keys whose occurrences always collect into an array
    pub array_keys: BTreeSet<String>,

    /// Keys whose values are coerced to numbers when they parse as such
    pub number_keys: BTreeSet<String>,

    /// Keys treated as presence booleans; they only consume a following
    /// token when it is literally `true` or `false`
    pub boolean_keys: BTreeSet<String>,

    /// Coerce numeric-looking values of un-hinted keys
    pub parse_numbers: bool,

    /// Split dotted keys (`--a.b 1`) into nested objects
    pub split_dotted_keys: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            array_keys: BTreeSet::new(),
            number_keys: BTreeSet::new(),
            boolean_keys: BTreeSet::new(),
            parse_numbers: true,
            split_dotted_keys: true,
        }
    }
}

/// Tokenize an argument vector into a flat map.
///
/// Supports `--name`, `--name=value`, `--name value`, `--no-name`, `-x`,
/// `-x=value`, `-x value`, short clusters (`-abc`), attached short numbers
/// (`-n5`), and the `--` terminator after which everything is positional.
/// The `_` bucket is always present, even when empty.
pub fn tokenize(argv: &[String], config: &TokenizerConfig) -> Map<String, Value> {
    let mut map = Map::new();
    let mut positionals: Vec<Value> = Vec::new();
    let mut i = 0;

    while i < argv.len() {
        let token = argv[i].as_str();

        if token == "--" {
            for rest in &argv[i + 1..] {
                positionals.push(coerce_value(POSITIONAL_KEY, rest, config));
            }
            break;
        }

        if let Some(body) = token.strip_prefix("--") {
            if let Some((key, raw)) = body.split_once('=') {
                insert(&mut map, key, coerce_value(key, raw, config), config);
            } else if let Some(key) = body.strip_prefix("no-") {
                insert(&mut map, key, Value::Bool(false), config);
            } else if consumes_value(body, argv.get(i + 1), config) {
                insert(&mut map, body, coerce_value(body, &argv[i + 1], config), config);
                i += 1;
            } else {
                insert(&mut map, body, Value::Bool(true), config);
            }
        } else if is_flag_token(token) {
            let body = &token[1..];
            if let Some((key, raw)) = body.split_once('=') {
                insert(&mut map, key, coerce_value(key, raw, config), config);
            } else if body.chars().count() == 1 {
                if consumes_value(body, argv.get(i + 1), config) {
                    insert(&mut map, body, coerce_value(body, &argv[i + 1], config), config);
                    i += 1;
                } else {
                    insert(&mut map, body, Value::Bool(true), config);
                }
            } else {
                tokenize_short_cluster(&mut map, body, argv.get(i + 1), config, &mut i);
            }
        } else {
            positionals.push(coerce_value(POSITIONAL_KEY, token, config));
        }

        i += 1;
    }

    map.insert(POSITIONAL_KEY.to_string(), Value::Array(positionals));
    map
}

/// Handle a multi-character short token (`-abc`, `-n5`).
fn tokenize_short_cluster(
    map: &mut Map<String, Value>,
    body: &str,
    next: Option<&String>,
    config: &TokenizerConfig,
    i: &mut usize,
) {
    let Some(first) = body.chars().next() else { return };
    let first = first.to_string();
    let rest = &body[first.len()..];

    // Attached value form: -n5 is n=5
    if parse_number(rest).is_some() {
        insert(map, &first, coerce_value(&first, rest, config), config);
        return;
    }

    // Cluster form: every char is a flag; the last one may take a value
    let flags: Vec<String> = body.chars().map(|c| c.to_string()).collect();
    for key in &flags[..flags.len() - 1] {
        insert(map, key, Value::Bool(true), config);
    }
    let last = &flags[flags.len() - 1];
    if consumes_value(last, next, config) {
        let raw = next.map(String::as_str).unwrap_or_default();
        insert(map, last, coerce_value(last, raw, config), config);
        *i += 1;
    } else {
        insert(map, last, Value::Bool(true), config);
    }
}

/// A token is a flag when it is dash-prefixed, longer than a bare dash, and
/// does not read as a negative number.
fn is_flag_token(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-') && parse_number(token).is_none()
}

/// Whether `key` consumes the following token as its value.
fn consumes_value(key: &str, next: Option<&String>, config: &TokenizerConfig) -> bool {
    let Some(next) = next else { return false };
    if config.boolean_keys.contains(key) {
        next == "true" || next == "false"
    } else {
        !is_flag_token(next)
    }
}

/// Coerce one raw token according to the key hints.
fn coerce_value(key: &str, raw: &str, config: &TokenizerConfig) -> Value {
    if config.boolean_keys.contains(key) {
        return Value::Bool(raw != "false");
    }
    if config.number_keys.contains(key) || config.parse_numbers {
        if let Some(number) = parse_number(raw) {
            return number;
        }
    }
    Value::String(raw.to_string())
}

/// Parse a full numeric literal, preferring integers; non-finite floats are
/// not numbers.
fn parse_number(raw: &str) -> Option<Value> {
    if raw.is_empty() {
        return None;
    }
    if let Ok(integer) = raw.parse::<i64>() {
        return Some(Value::from(integer));
    }
    let float = raw.parse::<f64>().ok()?;
    serde_json::Number::from_f64(float).map(Value::Number)
}

fn insert(map: &mut Map<String, Value>, key: &str, value: Value, config: &TokenizerConfig) {
    if config.split_dotted_keys && key.contains('.') {
        let segments: Vec<&str> = key.split('.').collect();
        insert_path(map, &segments, value);
        return;
    }

    if config.array_keys.contains(key) {
        match map.get_mut(key) {
            Some(Value::Array(items)) => items.push(value),
            _ => {
                map.insert(key.to_string(), Value::Array(vec![value]));
            }
        }
    } else {
        // Last occurrence wins for keys without an array hint
        map.insert(key.to_string(), value);
    }
}

fn insert_path(map: &mut Map<String, Value>, segments: &[&str], value: Value) {
    let (head, rest) = match segments {
        [head, rest @ ..] => (*head, rest),
        [] => return,
    };

    if rest.is_empty() {
        map.insert(head.to_string(), value);
        return;
    }

    let entry = map
        .entry(head.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(nested) = entry {
        insert_path(nested, rest, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn raw_config() -> TokenizerConfig {
        TokenizerConfig {
            parse_numbers: false,
            split_dotted_keys: false,
            ..TokenizerConfig::default()
        }
    }

    #[test]
    fn collects_positionals_in_order() {
        let map = tokenize(&args(&["one", "two", "three"]), &raw_config());
        assert_eq!(Value::Object(map), json!({ "_": ["one", "two", "three"] }));
    }

    #[test]
    fn parses_long_and_short_flags() {
        let map = tokenize(&args(&["-a", "1", "--beta", "2", "--gamma=3"]), &raw_config());
        assert_eq!(
            Value::Object(map),
            json!({ "_": [], "a": "1", "beta": "2", "gamma": "3" })
        );
    }

    #[test]
    fn bare_flags_become_true_and_negation_false() {
        let map = tokenize(&args(&["--force", "--no-color"]), &raw_config());
        assert_eq!(Value::Object(map), json!({ "_": [], "force": true, "color": false }));
    }

    #[test]
    fn double_dash_terminates_flag_parsing() {
        let map = tokenize(&args(&["-a", "1", "--", "-b", "--c"]), &raw_config());
        assert_eq!(Value::Object(map), json!({ "_": ["-b", "--c"], "a": "1" }));
    }

    #[test]
    fn array_hint_collects_and_last_wins_without_it() {
        let mut config = raw_config();
        config.array_keys.insert("a".to_string());
        let map = tokenize(&args(&["-a", "1", "-a", "2", "-b", "1", "-b", "2"]), &config);
        assert_eq!(Value::Object(map), json!({ "_": [], "a": ["1", "2"], "b": "2" }));
    }

    #[test]
    fn number_hint_coerces_per_value() {
        let mut config = raw_config();
        config.number_keys.insert("a".to_string());
        let map = tokenize(&args(&["-a", "3", "-b", "3"]), &config);
        assert_eq!(Value::Object(map), json!({ "_": [], "a": 3, "b": "3" }));
    }

    #[test]
    fn unparseable_number_stays_a_string() {
        let mut config = raw_config();
        config.number_keys.insert("a".to_string());
        let map = tokenize(&args(&["-a", "Hello, World"]), &config);
        assert_eq!(Value::Object(map), json!({ "_": [], "a": "Hello, World" }));
    }

    #[test]
    fn boolean_hint_only_consumes_literal_booleans() {
        let mut config = raw_config();
        config.boolean_keys.insert("v".to_string());
        let map = tokenize(&args(&["-v", "file", "-v", "false"]), &config);
        assert_eq!(Value::Object(map), json!({ "_": ["file"], "v": false }));
    }

    #[test]
    fn negative_numbers_are_values_not_flags() {
        let mut config = raw_config();
        config.number_keys.insert("n".to_string());
        let map = tokenize(&args(&["-n", "-5"]), &config);
        assert_eq!(Value::Object(map), json!({ "_": [], "n": -5 }));
    }

    #[test]
    fn short_clusters_and_attached_numbers() {
        let map = tokenize(&args(&["-abc", "-n5"]), &raw_config());
        assert_eq!(
            Value::Object(map),
            json!({ "_": [], "a": true, "b": true, "c": true, "n": "5" })
        );
    }

    #[test]
    fn implicit_numeric_coercion_is_opt_in() {
        let on = TokenizerConfig::default();
        let map = tokenize(&args(&["-a", "1", "2"]), &on);
        assert_eq!(Value::Object(map), json!({ "_": [2], "a": 1 }));

        let map = tokenize(&args(&["-a", "1", "2"]), &raw_config());
        assert_eq!(Value::Object(map), json!({ "_": ["2"], "a": "1" }));
    }

    #[test]
    fn dotted_keys_split_only_when_enabled() {
        let on = TokenizerConfig::default();
        let map = tokenize(&args(&["--db.host", "local"]), &on);
        assert_eq!(Value::Object(map), json!({ "_": [], "db": { "host": "local" } }));

        let map = tokenize(&args(&["--db.host", "local"]), &raw_config());
        assert_eq!(Value::Object(map), json!({ "_": [], "db.host": "local" }));
    }
}
