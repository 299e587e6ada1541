use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::domain::error::DomainError;
use crate::domain::param::{Param, ParamSet};
use crate::domain::value_objects::{Encoding, LineSeparator};

// ============================================================================
// LineTemplate - one text line per row
// ============================================================================

/// Template for the file builder.
///
/// Output layout: optional header, one rendered `pattern` per row (each
/// followed by `delimiter` except the last), optional footer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineTemplate {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file_name: Option<String>,
    #[serde(default)]
    pub encoding: Encoding,
    #[serde(default)]
    pub line_separator: LineSeparator,
    #[serde(default)]
    pub bom: bool,
    #[serde(default)]
    pub params: ParamSet,
}

impl LineTemplate {
    pub fn builder() -> LineTemplateBuilder {
        LineTemplateBuilder::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "name" });
        }
        if self.pattern.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "pattern" });
        }
        self.params.validate()
    }

    pub fn header_text(&self) -> Option<&str> {
        non_blank(self.header.as_ref())
    }

    pub fn footer_text(&self) -> Option<&str> {
        non_blank(self.footer.as_ref())
    }

    /// Delimiter placed after every row except the last; empty means none.
    pub fn delimiter_text(&self) -> Option<&str> {
        self.delimiter.as_deref().filter(|d| !d.is_empty())
    }

    /// Copy with a fresh id.
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

// ============================================================================
// LineTemplateBuilder
// ============================================================================

#[derive(Debug, Default)]
pub struct LineTemplateBuilder {
    id: Option<Uuid>,
    name: Option<String>,
    description: Option<String>,
    header: Option<String>,
    pattern: Option<String>,
    footer: Option<String>,
    delimiter: Option<String>,
    output_file_name: Option<String>,
    encoding: Encoding,
    line_separator: LineSeparator,
    bom: bool,
    params: Vec<Param>,
}

impl LineTemplateBuilder {
    pub fn id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    pub fn delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = Some(delimiter.into());
        self
    }

    pub fn output_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.output_file_name = Some(file_name.into());
        self
    }

    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn line_separator(mut self, separator: LineSeparator) -> Self {
        self.line_separator = separator;
        self
    }

    pub fn bom(mut self, bom: bool) -> Self {
        self.bom = bom;
        self
    }

    /// Add a single parameter (accumulates).
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// Consume builder and construct `LineTemplate`.
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` if name/pattern not set or blank
    /// - `DuplicateParam` / `InvalidParamName` for bad parameters
    pub fn build(self) -> Result<LineTemplate, DomainError> {
        let template = LineTemplate {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self
                .name
                .ok_or(DomainError::MissingRequiredField { field: "name" })?,
            description: self.description,
            header: self.header,
            pattern: self
                .pattern
                .ok_or(DomainError::MissingRequiredField { field: "pattern" })?,
            footer: self.footer,
            delimiter: self.delimiter,
            output_file_name: self.output_file_name,
            encoding: self.encoding,
            line_separator: self.line_separator,
            bom: self.bom,
            params: ParamSet::try_from(self.params)?,
        };
        template.validate()?;
        Ok(template)
    }
}
