//! Schema-driven validation for command line arguments.
//!
//! This crate derives a tokenizer configuration from a declarative schema,
//! runs parse-then-validate over an argument vector, and translates raw
//! validation failures into precise, user-facing diagnostics phrased in
//! terms of flags (`-a`/`--name`) and positional arguments.

mod error;
mod format;
mod introspect;
mod parser;
mod tokenizer;
mod violation;

// Re-export core types
pub use error::{Error, Result};
pub use introspect::{PropertyClass, ScalarKind, TokenizerHints, classify, deduce_item_type};
pub use parser::{Parser, ParserOptions, configure};
pub use tokenizer::{POSITIONAL_KEY, TokenizerConfig, tokenize};
pub use violation::{ValidationFailure, Violation, ViolationKind};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
