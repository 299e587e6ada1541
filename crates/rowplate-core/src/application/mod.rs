//! Application layer for rowplate.
//!
//! This layer contains:
//! - **Services**: parameter resolution, line/request iteration, validation,
//!   the file builder and the HTTP sender
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Worker**: background runs with lifecycle events and cancellation
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer; the substitution
//! rules themselves live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod run;
pub mod services;
pub mod worker;

// Re-export main services
pub use services::{
    BatchRequestQueue, BuildSummary, Credentials, FileBuilder, HttpSender, LogRecord,
    ParamResolver, RecordIterator, SendOptions, SendReport, TemplateInfo, TemplateService,
    Validator,
};

// Re-export port traits (for adapter implementation)
pub use ports::{ByteSink, FakeDataProvider, HttpTransport, TemplateRepository};

pub use error::ApplicationError;
pub use run::{CancellationToken, Outcome, Progress};
pub use worker::{RunEvent, RunHandle, Worker};
