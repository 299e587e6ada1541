//! `${name}` placeholder substitution.
//!
//! ## Syntax
//!
//! | Input | Meaning |
//! |-------|---------|
//! | `${key}` | replaced by the value of `key`, left untouched when unknown |
//! | `\x` | the character `x` taken literally (`\${key}` renders `${key}`) |
//! | `${}` | plain text, never a placeholder |
//!
//! Values are inserted verbatim: a `$` or `\` inside a value is never
//! re-interpreted, because substitution is a single left-to-right pass over
//! the template text.

use std::collections::HashMap;

/// A lexical piece of template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Literal(&'a str),
    Escaped { raw: &'a str, ch: char },
    Placeholder { raw: &'a str, key: &'a str },
}

impl<'a> Token<'a> {
    fn raw(&self) -> &'a str {
        match *self {
            Self::Literal(raw) | Self::Escaped { raw, .. } | Self::Placeholder { raw, .. } => raw,
        }
    }
}

struct Tokens<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }
}

/// Recognise an escape or placeholder starting at the beginning of `s`.
fn special_at(s: &str) -> Option<Token<'_>> {
    let mut chars = s.chars();
    match chars.next()? {
        '\\' => {
            let ch = chars.next()?;
            // A backslash before a line break is not an escape.
            if ch == '\n' || ch == '\r' {
                return None;
            }
            Some(Token::Escaped {
                raw: &s[..1 + ch.len_utf8()],
                ch,
            })
        }
        '$' => {
            let body = s.strip_prefix("${")?;
            let close = body.find('}')?;
            if close == 0 {
                return None;
            }
            Some(Token::Placeholder {
                raw: &s[..close + 3],
                key: &body[..close],
            })
        }
        _ => None,
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        let rest = &self.text[self.pos..];
        if rest.is_empty() {
            return None;
        }

        let token = special_at(rest).unwrap_or_else(|| {
            let end = rest
                .char_indices()
                .skip(1)
                .find(|&(i, c)| (c == '\\' || c == '$') && special_at(&rest[i..]).is_some())
                .map_or(rest.len(), |(i, _)| i);
            Token::Literal(&rest[..end])
        });

        self.pos += token.raw().len();
        Some(token)
    }
}

/// Replace every known `${key}` in `text` with its value.
///
/// Unknown keys stay as they are so the validator can report them.
/// Blank input renders as the empty string.
pub fn replace(text: &str, values: &HashMap<String, String>) -> String {
    if text.trim().is_empty() {
        return String::new();
    }

    let mut out = String::with_capacity(text.len());
    for token in Tokens::new(text) {
        match token {
            Token::Literal(s) => out.push_str(s),
            Token::Escaped { ch, .. } => out.push(ch),
            Token::Placeholder { raw, key } => match values.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(raw),
            },
        }
    }
    out
}

/// True if `text` still holds a `${...}` token with a non-empty key.
pub fn contains_placeholders(text: &str) -> bool {
    text.match_indices("${")
        .any(|(i, _)| special_at(&text[i..]).is_some())
}

/// Delete every `${...}` token and escape sequence from `text`.
///
/// Used to derive an origin from a URI template before any row is known.
pub fn remove_placeholders(text: &str) -> String {
    Tokens::new(text)
        .filter_map(|t| match t {
            Token::Literal(s) => Some(s),
            Token::Escaped { .. } | Token::Placeholder { .. } => None,
        })
        .collect()
}
