use argschema::{ParserOptions, configure};
use proptest::prelude::*;
use serde_json::json;

/// Bare tokens that can never be mistaken for flags or numbers.
fn any_positional() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}"
}

fn any_flag_name() -> impl Strategy<Value = String> {
    "[a-z]{1,6}"
}

proptest! {
    #[test]
    fn empty_schema_accepts_any_positionals_in_order(tokens in proptest::collection::vec(any_positional(), 0..12)) {
        let parser = configure(ParserOptions::default()).expect("empty schema");
        let parsed = parser.parse(&tokens).expect("permissive schema never fails");

        let bucket: Vec<String> = parsed["_"]
            .as_array()
            .expect("positional bucket")
            .iter()
            .map(|v| v.as_str().expect("positionals stay strings").to_string())
            .collect();
        prop_assert_eq!(bucket, tokens);
    }

    #[test]
    fn empty_schema_accepts_arbitrary_flag_soup(
        pairs in proptest::collection::vec((any_flag_name(), any_positional()), 0..8)
    ) {
        let mut argv = Vec::new();
        for (flag, value) in &pairs {
            argv.push(format!("--{flag}"));
            argv.push(value.clone());
        }

        let parser = configure(ParserOptions::default()).expect("empty schema");
        let parsed = parser.parse(&argv).expect("permissive schema never fails");
        prop_assert!(parsed.get("_").is_some());
    }

    #[test]
    fn parse_and_format_are_deterministic(
        flags in proptest::collection::vec(any_flag_name(), 1..6)
    ) {
        let schema = json!({ "additionalProperties": false });
        let parser = configure(ParserOptions { schema: Some(schema) }).expect("schema compiles");

        let argv: Vec<String> = flags.iter().map(|f| format!("--{f}")).collect();
        let first = parser.parse(&argv);
        let second = parser.parse(&argv);

        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.message, b.message),
            _ => prop_assert!(false, "same input produced different outcomes"),
        }
    }
}

#[test]
fn version_is_exposed() {
    assert!(!argschema::VERSION.is_empty());
}
