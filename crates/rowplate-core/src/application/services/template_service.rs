//! Template Service - template lookup and authoring checks.
//!
//! Loads templates through the repository port and rejects the ones a run
//! could never use: rule violations and fake-data expressions the provider
//! does not understand.

use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    application::{ports::TemplateRepository, services::ParamResolver},
    domain::{DomainValidator as validator, LineTemplate, RequestTemplate},
    error::RowplateResult,
};

/// Information about a template for display purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    pub name: String,
    pub mode: &'static str,
    pub description: String,
    pub params: usize,
}

/// Service for template operations.
pub struct TemplateService {
    repository: Box<dyn TemplateRepository>,
    resolver: ParamResolver,
}

impl TemplateService {
    pub fn new(repository: Box<dyn TemplateRepository>, resolver: ParamResolver) -> Self {
        Self {
            repository,
            resolver,
        }
    }

    /// Get a checked line template by name.
    #[instrument(skip(self))]
    pub fn line_template(&self, name: &str) -> RowplateResult<LineTemplate> {
        let template = self.repository.find_line(name)?;
        self.check_line(&template)?;
        debug!(id = %template.id, "line template loaded");
        Ok(template)
    }

    /// Get a checked request template by name.
    #[instrument(skip(self))]
    pub fn request_template(&self, name: &str) -> RowplateResult<RequestTemplate> {
        let template = self.repository.find_request(name)?;
        self.check_request(&template)?;
        debug!(id = %template.id, "request template loaded");
        Ok(template)
    }

    pub fn check_line(&self, template: &LineTemplate) -> RowplateResult<()> {
        validator::validate_line_template(template)?;
        self.resolver.check_expressions(&template.params)
    }

    pub fn check_request(&self, template: &RequestTemplate) -> RowplateResult<()> {
        validator::validate_request_template(template)?;
        self.resolver.check_expressions(&template.params)
    }

    /// List all templates, line templates first.
    pub fn list(&self) -> RowplateResult<Vec<TemplateInfo>> {
        let lines = self.repository.line_templates()?.into_iter().map(|t| TemplateInfo {
            name: t.name,
            mode: "line",
            description: t.description.unwrap_or_default(),
            params: t.params.len(),
        });
        let requests = self
            .repository
            .request_templates()?
            .into_iter()
            .map(|t| TemplateInfo {
                name: t.name,
                mode: if t.batch.is_enabled() { "request (batch)" } else { "request" },
                description: t.description.unwrap_or_default(),
                params: t.params.len(),
            });
        Ok(lines.chain(requests).collect())
    }
}
