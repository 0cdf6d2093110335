//! Placeholder substitution

use std::borrow::Cow;

use serde::Serialize;
use shared_types::{ResolvedDocument, Template};

use crate::format::FormatterSet;
use crate::tokenizer::{tokenize, Piece, Token};
use crate::FieldValues;

/// Rendering of a placeholder nobody filled in: `{key}`
pub fn unresolved_marker(key: &str) -> String {
    format!("{{{}}}", key)
}

/// One piece of resolved text, tagged with where it came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment<'a> {
    /// Template text outside any token
    Literal { text: &'a str },
    /// Formatted live value
    Value { key: &'a str, text: String },
    /// The token's own default
    Default { key: &'a str, text: &'a str },
    /// No value and no default
    Unresolved { key: &'a str },
}

impl Segment<'_> {
    pub fn text(&self) -> Cow<'_, str> {
        match self {
            Segment::Literal { text } | Segment::Default { text, .. } => Cow::Borrowed(*text),
            Segment::Value { text, .. } => Cow::Borrowed(text.as_str()),
            Segment::Unresolved { key } => Cow::Owned(unresolved_marker(key)),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Segment::Unresolved { .. })
    }
}

/// Substitutes live values into placeholder tokens.
///
/// Resolution is a pure function of the text, the values and the
/// formatter rules.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    formatters: FormatterSet,
}

impl Resolver {
    pub fn new(formatters: FormatterSet) -> Self {
        Self { formatters }
    }

    pub fn formatters(&self) -> &FormatterSet {
        &self.formatters
    }

    /// Resolve `text` into tagged segments
    pub fn segments<'a>(&self, text: &'a str, values: &FieldValues) -> Vec<Segment<'a>> {
        tokenize(text)
            .into_iter()
            .map(|piece| match piece {
                Piece::Literal(text) => Segment::Literal { text },
                Piece::Token(token) => self.resolve_token(token, values),
            })
            .collect()
    }

    /// Resolve every token of `text`
    pub fn resolve(&self, text: &str, values: &FieldValues) -> String {
        self.segments(text, values)
            .iter()
            .map(|segment| segment.text())
            .collect()
    }

    /// Resolve all four template fields verbatim
    pub fn resolve_template(&self, template: &Template, values: &FieldValues) -> ResolvedDocument {
        ResolvedDocument {
            title: self.resolve(&template.title, values),
            body: self.resolve(&template.body, values),
            signer1: self.resolve(&template.signer1, values),
            signer2: self.resolve(&template.signer2, values),
        }
    }

    /// Keys of `text` that would render as unresolved markers
    pub fn unresolved_keys<'a>(&self, text: &'a str, values: &FieldValues) -> Vec<&'a str> {
        self.segments(text, values)
            .into_iter()
            .filter_map(|segment| match segment {
                Segment::Unresolved { key } => Some(key),
                _ => None,
            })
            .collect()
    }

    fn resolve_token<'a>(&self, token: Token<'a>, values: &FieldValues) -> Segment<'a> {
        let live = values.get(token.key).map(String::as_str).unwrap_or("");
        if !live.is_empty() {
            let formatted = self.formatters.format(token.key, live);
            if !formatted.is_empty() {
                return Segment::Value {
                    key: token.key,
                    text: formatted,
                };
            }
        }

        match token.default {
            Some(default) if !default.is_empty() => Segment::Default {
                key: token.key,
                text: default,
            },
            _ => Segment::Unresolved { key: token.key },
        }
    }
}
