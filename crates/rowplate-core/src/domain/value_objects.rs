//! Domain value objects: ParamType, Encoding, LineSeparator, HttpMethod, CellDelimiter.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! Each one owns its string representation and a `FromStr` parser so the
//! CLI and the template files share one spelling.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── ParamType ────────────────────────────────────────────────────────────────

/// How a named parameter gets its value.
///
/// `Constant` and `Choice` are supplied by the user. Every other type is
/// generated by the engine and recomputed for every output unit.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamType {
    #[default]
    Constant,
    Choice,
    Datafaker,
    Password,
    PasswordBase64,
    Timestamp,
    Uuid,
}

impl ParamType {
    pub const ALL: [ParamType; 7] = [
        Self::Constant,
        Self::Choice,
        Self::Datafaker,
        Self::Password,
        Self::PasswordBase64,
        Self::Timestamp,
        Self::Uuid,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Constant => "CONSTANT",
            Self::Choice => "CHOICE",
            Self::Datafaker => "DATAFAKER",
            Self::Password => "PASSWORD",
            Self::PasswordBase64 => "PASSWORD_BASE64",
            Self::Timestamp => "TIMESTAMP",
            Self::Uuid => "UUID",
        }
    }

    /// Engine-generated types, refreshed before every unit.
    pub const fn is_volatile(self) -> bool {
        !self.is_user_supplied()
    }

    pub const fn is_user_supplied(self) -> bool {
        matches!(self, Self::Constant | Self::Choice)
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().replace('-', "_").as_str() {
            "CONSTANT" => Ok(Self::Constant),
            "CHOICE" => Ok(Self::Choice),
            "DATAFAKER" | "FAKER" => Ok(Self::Datafaker),
            "PASSWORD" => Ok(Self::Password),
            "PASSWORD_BASE64" => Ok(Self::PasswordBase64),
            "TIMESTAMP" => Ok(Self::Timestamp),
            "UUID" => Ok(Self::Uuid),
            _ => Err(DomainError::UnknownValue {
                kind: "parameter type",
                value: s.to_string(),
            }),
        }
    }
}

// ── Encoding ─────────────────────────────────────────────────────────────────

/// Character encoding of generated files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "UTF-8", alias = "utf-8", alias = "utf8")]
    Utf8,
    #[serde(rename = "UTF-16LE", alias = "utf-16le")]
    Utf16Le,
    #[serde(rename = "UTF-16BE", alias = "utf-16be")]
    Utf16Be,
}

impl Encoding {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Utf8 => "UTF-8",
            Self::Utf16Le => "UTF-16LE",
            Self::Utf16Be => "UTF-16BE",
        }
    }

    pub const fn bom(&self) -> &'static [u8] {
        match self {
            Self::Utf8 => &[0xEF, 0xBB, 0xBF],
            Self::Utf16Le => &[0xFF, 0xFE],
            Self::Utf16Be => &[0xFE, 0xFF],
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Utf16Le => text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
            Self::Utf16Be => text.encode_utf16().flat_map(u16::to_be_bytes).collect(),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Encoding {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "utf-8" | "utf8" => Ok(Self::Utf8),
            "utf-16le" | "utf16le" => Ok(Self::Utf16Le),
            "utf-16be" | "utf16be" => Ok(Self::Utf16Be),
            _ => Err(DomainError::UnknownValue {
                kind: "encoding",
                value: s.to_string(),
            }),
        }
    }
}

// ── LineSeparator ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSeparator {
    #[default]
    Unix,
    Windows,
    Mac,
}

impl LineSeparator {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Windows => "windows",
            Self::Mac => "mac",
        }
    }

    pub const fn chars(&self) -> &'static str {
        match self {
            Self::Unix => "\n",
            Self::Windows => "\r\n",
            Self::Mac => "\r",
        }
    }
}

impl fmt::Display for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LineSeparator {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | "lf" => Ok(Self::Unix),
            "windows" | "crlf" => Ok(Self::Windows),
            "mac" | "cr" => Ok(Self::Mac),
            _ => Err(DomainError::UnknownValue {
                kind: "line separator",
                value: s.to_string(),
            }),
        }
    }
}

// ── HttpMethod ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            _ => Err(DomainError::UnknownValue {
                kind: "HTTP method",
                value: s.to_string(),
            }),
        }
    }
}

// ── CellDelimiter ────────────────────────────────────────────────────────────

/// Separator between cells of a replacement-table line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CellDelimiter {
    Comma,
    Semicolon,
    #[default]
    Any,
}

impl CellDelimiter {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Any => "any",
        }
    }

    fn matches(self, c: char) -> bool {
        match self {
            Self::Comma => c == ',',
            Self::Semicolon => c == ';',
            Self::Any => c == ',' || c == ';',
        }
    }

    /// Split one line into cells.
    ///
    /// Trailing empty cells are dropped, so `a,b,` has two cells while
    /// `a,,b` keeps its empty middle cell.
    pub fn split(self, line: &str) -> Vec<String> {
        let mut cells: Vec<String> = line
            .split(|c| self.matches(c))
            .map(str::to_string)
            .collect();
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        cells
    }
}

impl fmt::Display for CellDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CellDelimiter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "comma" | "," => Ok(Self::Comma),
            "semicolon" | ";" => Ok(Self::Semicolon),
            "any" | ",;" => Ok(Self::Any),
            _ => Err(DomainError::UnknownValue {
                kind: "cell delimiter",
                value: s.to_string(),
            }),
        }
    }
}
