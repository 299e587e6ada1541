//! Application layer errors.
//!
//! These errors represent failures in orchestration and I/O, not template
//! rules. Rule violations are `DomainError` from `crate::domain`.

use thiserror::Error;

use crate::error::ErrorCategory;

/// Errors that occur while running templates against a table.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApplicationError {
    /// Reading input or writing output failed.
    #[error("I/O error while {context}: {reason}")]
    Io { context: String, reason: String },

    /// A rendered URI is not a valid absolute URL.
    #[error("Invalid URI '{uri}': {reason}")]
    InvalidUri { uri: String, reason: String },

    /// The HTTP transport could not deliver a request.
    #[error("Transport error: {reason}")]
    Transport { reason: String },

    /// A fake-data expression could not be evaluated.
    #[error("Fake data expression '{expression}' failed: {reason}")]
    FakeData { expression: String, reason: String },

    /// No template with this name exists.
    #[error("Template not found: {name}")]
    TemplateNotFound { name: String },

    /// A template document could not be parsed.
    #[error("Could not read templates from {source_name}: {reason}")]
    TemplateParse { source_name: String, reason: String },

    /// A run for this template is already in progress.
    #[error("A run for template '{template}' is already active")]
    RunAlreadyActive { template: String },

    /// The background worker could not be started.
    #[error("Worker error: {reason}")]
    Worker { reason: String },

    /// Shared run bookkeeping is unusable (lock poisoned).
    #[error("Run registry lock poisoned")]
    LockPoisoned,
}

impl ApplicationError {
    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Io { context, .. } => vec![
                format!("Failed while {context}"),
                "Check that the path exists and that you have permission".into(),
            ],
            Self::InvalidUri { uri, .. } => vec![
                format!("Rendered URI: {uri}"),
                "The URI must be absolute, e.g. https://host/path".into(),
                "Check that every placeholder in the URI resolves".into(),
            ],
            Self::Transport { .. } => vec![
                "Check that the server is reachable".into(),
                "Increase the wait timeout of the template if the server is slow".into(),
            ],
            Self::FakeData { .. } => vec![
                "Fake data expressions look like #{category.key}, e.g. #{color.name}".into(),
                "Keys are case-insensitive and may use snake_case or camelCase".into(),
            ],
            Self::TemplateNotFound { .. } => vec![
                "Try: rowplate list <templates.toml> to see available templates".into(),
            ],
            Self::TemplateParse { .. } => vec![
                "Check the TOML syntax of the template file".into(),
                "Top-level keys are line_templates and request_templates".into(),
            ],
            Self::RunAlreadyActive { .. } => vec![
                "Wait for the running job to finish or cancel it".into(),
            ],
            Self::Worker { .. } | Self::LockPoisoned => {
                vec!["Restart the command and try again".into()]
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Io { .. } | Self::Transport { .. } => ErrorCategory::Io,
            Self::InvalidUri { .. } | Self::TemplateParse { .. } => ErrorCategory::Configuration,
            Self::FakeData { .. } | Self::RunAlreadyActive { .. } => ErrorCategory::Validation,
            Self::TemplateNotFound { .. } => ErrorCategory::NotFound,
            Self::Worker { .. } | Self::LockPoisoned => ErrorCategory::Internal,
        }
    }
}
