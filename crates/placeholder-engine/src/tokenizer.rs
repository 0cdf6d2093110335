//! Placeholder token grammar
//!
//! A token is `{{` followed by one or more characters other than `}`,
//! closed by `}}`. This is exactly the language of `\{\{([^}]+)\}\}` scanned
//! leftmost and non-overlapping. The inner text is split on the first `|`
//! into key and default, both trimmed.

/// A single `{{key}}` / `{{key|default}}` occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The whole token including braces
    pub raw: &'a str,
    /// Byte offset of the opening `{{`
    pub offset: usize,
    pub key: &'a str,
    /// Text after the first `|`, if any
    pub default: Option<&'a str>,
}

/// Piece of a tokenized text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Literal(&'a str),
    Token(Token<'a>),
}

/// Iterator over the tokens of a text
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let (start, end) = find_token(self.text, self.pos)?;
        self.pos = end;
        Some(parse_token(self.text, start, end))
    }
}

/// Iterate over the tokens of `text` in order of appearance
pub fn tokens(text: &str) -> Tokens<'_> {
    Tokens { text, pos: 0 }
}

/// Split `text` into literal runs and tokens.
///
/// Concatenating the raw text of every piece yields `text` back.
pub fn tokenize(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for token in tokens(text) {
        if token.offset > last {
            pieces.push(Piece::Literal(&text[last..token.offset]));
        }
        last = token.offset + token.raw.len();
        pieces.push(Piece::Token(token));
    }

    if last < text.len() {
        pieces.push(Piece::Literal(&text[last..]));
    }

    pieces
}

/// True if `text` still contains at least one token
pub fn has_tokens(text: &str) -> bool {
    find_token(text, 0).is_some()
}

/// Find the next token at or after byte `from`, returning its byte span.
///
/// `{` and `}` are ASCII, so scanning bytes never splits a UTF-8 sequence.
fn find_token(text: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    let mut i = from;

    while i + 1 < bytes.len() {
        if bytes[i] == b'{' && bytes[i + 1] == b'{' {
            let content_start = i + 2;
            // No closing brace anywhere ahead: no later position can match either
            let close = content_start + bytes[content_start..].iter().position(|&b| b == b'}')?;
            if close > content_start && bytes.get(close + 1) == Some(&b'}') {
                return Some((i, close + 2));
            }
        }
        i += 1;
    }

    None
}

fn parse_token(text: &str, start: usize, end: usize) -> Token<'_> {
    let inner = &text[start + 2..end - 2];
    let (key, default) = match inner.split_once('|') {
        Some((key, default)) => (key.trim(), Some(default.trim())),
        None => (inner.trim(), None),
    };

    Token {
        raw: &text[start..end],
        offset: start,
        key,
        default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(text: &str) -> Vec<&str> {
        tokens(text).map(|t| t.key).collect()
    }

    #[test]
    fn test_simple_tokens() {
        assert_eq!(keys("Eu, {{nome}}, CPF {{cpf}}."), vec!["nome", "cpf"]);
    }

    #[test]
    fn test_default_split_on_first_pipe() {
        let token = tokens("{{ apto | 101 | bloco B }}").next().unwrap();
        assert_eq!(token.key, "apto");
        assert_eq!(token.default, Some("101 | bloco B"));
    }

    #[test]
    fn test_empty_default_is_present() {
        let token = tokens("{{nome|}}").next().unwrap();
        assert_eq!(token.default, Some(""));
    }

    #[test]
    fn test_unterminated_token_is_literal() {
        assert!(keys("Eu, {{nome, declaro").is_empty());
        assert!(keys("{{nome}").is_empty());
        assert_eq!(tokenize("a {{b"), vec![Piece::Literal("a {{b")]);
    }

    #[test]
    fn test_empty_braces_are_literal() {
        assert!(keys("{{}}").is_empty());
        assert_eq!(keys("{{}}{{x}}"), vec!["x"]);
    }

    #[test]
    fn test_empty_key() {
        let token = tokens("{{ |padrão}}").next().unwrap();
        assert_eq!(token.key, "");
        assert_eq!(token.default, Some("padrão"));
    }

    #[test]
    fn test_extra_opening_brace_belongs_to_key() {
        let token = tokens("{{{a}}").next().unwrap();
        assert_eq!(token.offset, 0);
        assert_eq!(token.key, "{a");
    }

    #[test]
    fn test_inner_closing_brace_breaks_token() {
        assert!(keys("{{a}b}}").is_empty());
    }

    #[test]
    fn test_multibyte_text_around_tokens() {
        let text = "Mudança de {{condomínio}} às {{hora}}";
        assert_eq!(keys(text), vec!["condomínio", "hora"]);
    }

    #[test]
    fn test_tokenize_reassembles() {
        let text = "Título {{a}} meio {{b|x}} fim";
        let rebuilt: String = tokenize(text)
            .iter()
            .map(|p| match p {
                Piece::Literal(s) => *s,
                Piece::Token(t) => t.raw,
            })
            .collect();
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn test_has_tokens() {
        assert!(has_tokens("x {{y}}"));
        assert!(!has_tokens("x {y}"));
    }
}
