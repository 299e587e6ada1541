// ============================================================================
// domain/error.rs - template and parameter rule violations
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (they travel through worker events)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Template Errors
    // ========================================================================
    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Required field missing: {field}")]
    MissingRequiredField { field: &'static str },

    // ========================================================================
    // Parameter Errors
    // ========================================================================
    #[error("Invalid parameter name '{name}': {reason}")]
    InvalidParamName { name: String, reason: String },

    #[error("Duplicate parameter: {name}")]
    DuplicateParam { name: String },

    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParam { name: String, reason: String },

    // ========================================================================
    // Parsing Errors
    // ========================================================================
    #[error("Unknown {kind} '{value}'")]
    UnknownValue { kind: &'static str, value: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidTemplate(msg) => vec![
                "Check the template definition".into(),
                format!("Details: {msg}"),
            ],
            Self::MissingRequiredField { field } => {
                vec![format!("Add a non-blank '{field}' to the template")]
            }
            Self::InvalidParamName { .. } => vec![
                "Parameter names may only contain letters, digits, '_' and '-'".into(),
                "Names starting with '_' are reserved for row values".into(),
            ],
            Self::DuplicateParam { name } => vec![
                format!("Parameter '{name}' is declared more than once"),
                "Parameter names are case-sensitive and must be unique".into(),
            ],
            Self::InvalidParam { name, .. } => vec![
                format!("Fix the option of parameter '{name}'"),
                "Fake data expressions look like #{category.key}, e.g. #{color.name}".into(),
            ],
            Self::UnknownValue { kind, .. } => vec![format!("Check the spelling of the {kind}")],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTemplate(_)
            | Self::MissingRequiredField { .. }
            | Self::InvalidParamName { .. }
            | Self::DuplicateParam { .. }
            | Self::InvalidParam { .. }
            | Self::UnknownValue { .. } => ErrorCategory::Validation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Internal,
}
