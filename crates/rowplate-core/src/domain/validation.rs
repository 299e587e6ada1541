use crate::domain::{
    error::DomainError,
    param::Param,
    template::{LineTemplate, RequestTemplate},
};

/// Centralized domain validation.
///
/// Authoring-time rules only. Checks that need a collaborator (fake-data
/// expressions) live in the application layer.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_line_template(template: &LineTemplate) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_request_template(template: &RequestTemplate) -> Result<(), DomainError> {
        template.validate()
    }

    pub fn validate_param(param: &Param) -> Result<(), DomainError> {
        param.validate()
    }
}
