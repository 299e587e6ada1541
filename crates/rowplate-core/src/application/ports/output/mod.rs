//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `rowplate-adapters` crate provides implementations.

use std::io::Write;

use crate::application::ApplicationError;
use crate::domain::{LineTemplate, Request, RequestTemplate, Response};
use crate::error::RowplateResult;

/// Port for fake-data expressions such as `#{color.name}`.
///
/// Implemented by:
/// - `rowplate_adapters::faker::BuiltinFaker` (word pools, random numbers)
pub trait FakeDataProvider: Send + Sync {
    /// Evaluate an expression into a fresh value.
    fn evaluate(&self, expression: &str) -> RowplateResult<String>;

    /// Check an expression without caring about the value.
    fn validate(&self, expression: &str) -> RowplateResult<()> {
        self.evaluate(expression).map(|_| ())
    }
}

/// Port for delivering one HTTP request.
///
/// Implemented by:
/// - `rowplate_adapters::http::ReqwestTransport` (blocking reqwest client)
///
/// Any response, whatever its status, is `Ok`. `Err` means nothing came back
/// (connection refused, timeout, TLS failure).
pub trait HttpTransport: Send + Sync {
    fn execute(&self, request: &Request) -> RowplateResult<Response>;
}

/// Port for the destination of generated lines.
///
/// Implemented by:
/// - `rowplate_adapters::sink::FileSink` (create/truncate or append)
/// - `rowplate_adapters::sink::StdoutSink`
/// - `rowplate_adapters::sink::MemorySink` (testing)
pub trait ByteSink: Send + Sync {
    /// Open a writer positioned where output should go.
    fn open(&self) -> RowplateResult<Box<dyn Write + Send>>;

    /// True when writing continues existing content (no byte-order mark).
    fn appends(&self) -> bool;

    /// Human-readable destination, for logs.
    fn describe(&self) -> String;
}

/// Port for template storage.
///
/// Implemented by:
/// - `rowplate_adapters::template_loader::TomlTemplateRepository`
pub trait TemplateRepository: Send + Sync {
    fn line_templates(&self) -> RowplateResult<Vec<LineTemplate>>;

    fn request_templates(&self) -> RowplateResult<Vec<RequestTemplate>>;

    fn find_line(&self, name: &str) -> RowplateResult<LineTemplate> {
        self.line_templates()?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| {
                ApplicationError::TemplateNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    fn find_request(&self, name: &str) -> RowplateResult<RequestTemplate> {
        self.request_templates()?
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| {
                ApplicationError::TemplateNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }
}
