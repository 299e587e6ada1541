use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::non_blank;
use crate::domain::error::DomainError;
use crate::domain::param::{Param, ParamSet};
use crate::domain::value_objects::HttpMethod;

pub const DEFAULT_WAIT_TIMEOUT_SECS: u64 = 5;

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_SECS
}

// ============================================================================
// Batch - many rows in one request
// ============================================================================

/// Batch settings. A `size` of 0 or 1 means one request per row.
///
/// In batch mode the request body is `start + join(row bodies, separator) + end`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Batch {
    pub size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

impl Batch {
    pub fn of(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }

    pub fn with_wrapper(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.size > 1
    }

    /// Rows per request for a table of `rows` rows: `clamp(size, 1, rows)`.
    pub fn effective_size(&self, rows: usize) -> usize {
        self.size.clamp(1, rows.max(1))
    }
}

// ============================================================================
// RequestTemplate - one HTTP request per row (or per batch)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTemplate {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub uri: String,
    #[serde(default)]
    pub method: HttpMethod,
    /// Raw `Key: Value` lines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default = "default_wait_timeout")]
    pub wait_timeout_secs: u64,
    #[serde(default)]
    pub batch: Batch,
    #[serde(default)]
    pub params: ParamSet,
}

impl RequestTemplate {
    pub fn builder() -> RequestTemplateBuilder {
        RequestTemplateBuilder::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.name.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "name" });
        }
        if self.uri.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "uri" });
        }
        self.params.validate()
    }

    pub fn is_batch_mode(&self) -> bool {
        self.batch.is_enabled()
    }

    pub fn body_text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    pub fn headers_text(&self) -> Option<&str> {
        non_blank(self.headers.as_ref())
    }

    /// Header map parsed from the raw header lines.
    pub fn parsed_headers(&self) -> BTreeMap<String, String> {
        self.headers.as_deref().map(parse_headers).unwrap_or_default()
    }

    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            ..self.clone()
        }
    }
}

/// Parse `Key: Value` lines into an ordered map.
///
/// Keys and values are trimmed. A line is kept only when it holds exactly
/// one `:`; blank keys are dropped. Later lines win on duplicate keys.
pub fn parse_headers(text: &str) -> BTreeMap<String, String> {
    text.split(['\n', '\r'])
        .filter_map(|line| {
            let mut parts = line.split(':');
            let (key, value) = (parts.next()?, parts.next()?);
            if parts.next().is_some() {
                return None;
            }
            let key = key.trim();
            (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
        })
        .collect()
}

// ============================================================================
// RequestTemplateBuilder
// ============================================================================

#[derive(Debug, Default)]
pub struct RequestTemplateBuilder {
    id: Option<Uuid>,
    name: Option<String>,
    description: Option<String>,
    uri: Option<String>,
    method: HttpMethod,
    headers: Option<String>,
    body: Option<String>,
    wait_timeout_secs: Option<u64>,
    batch: Batch,
    params: Vec<Param>,
}

impl RequestTemplateBuilder {
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

    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    pub fn headers(mut self, headers: impl Into<String>) -> Self {
        self.headers = Some(headers.into());
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn wait_timeout_secs(mut self, secs: u64) -> Self {
        self.wait_timeout_secs = Some(secs);
        self
    }

    pub fn batch(mut self, batch: Batch) -> Self {
        self.batch = batch;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn build(self) -> Result<RequestTemplate, DomainError> {
        let template = RequestTemplate {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            name: self
                .name
                .ok_or(DomainError::MissingRequiredField { field: "name" })?,
            description: self.description,
            uri: self
                .uri
                .ok_or(DomainError::MissingRequiredField { field: "uri" })?,
            method: self.method,
            headers: self.headers,
            body: self.body,
            wait_timeout_secs: self.wait_timeout_secs.unwrap_or(DEFAULT_WAIT_TIMEOUT_SECS),
            batch: self.batch,
            params: ParamSet::try_from(self.params)?,
        };
        template.validate()?;
        Ok(template)
    }
}
