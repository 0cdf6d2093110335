//! Placeholder parsing and resolution
//!
//! Template text carries `{{key}}` and `{{key|default}}` tokens. This crate
//! provides:
//! - a tokenizer for the token grammar
//! - ordered placeholder discovery with defaults
//! - per-field formatting (CPF, long-form dates)
//! - substitution of live values, defaults, or `{key}` markers

pub mod extract;
pub mod format;
pub mod resolver;
pub mod tokenizer;

use std::collections::HashMap;

/// Live values typed by the user, keyed by placeholder key
pub type FieldValues = HashMap<String, String>;

pub use extract::{extract_from_template, extract_placeholders, seed_values, Placeholder};
pub use format::{format_cpf, format_long_date, FormatRule, FormatterSet};
pub use resolver::{unresolved_marker, Resolver, Segment};
pub use tokenizer::{has_tokens, tokenize, tokens, Piece, Token};
