//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports: resolving parameters,
//! iterating rows into lines or requests, validating, and running.

pub mod batch_queue;
pub mod file_builder;
pub mod http_sender;
pub mod param_resolver;
pub mod record_iterator;
pub mod template_service;
pub mod validator;

pub use batch_queue::BatchRequestQueue;
pub use file_builder::{BuildSummary, FileBuilder};
pub use http_sender::{
    Credentials, DEFAULT_PACING, Delivery, HttpSender, LogRecord, SendOptions, SendReport,
};
pub use param_resolver::{ConstantParams, ParamResolver};
pub use record_iterator::{LineKind, LineUnit, LineWriter, RecordIterator};
pub use template_service::{TemplateInfo, TemplateService};
pub use validator::Validator;
