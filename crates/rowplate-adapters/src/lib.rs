//! Infrastructure adapters for rowplate.
//!
//! This crate implements the ports defined in `rowplate-core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod faker;
pub mod http;
pub mod sink;
pub mod template_loader;

// Re-export commonly used adapters
pub use faker::BuiltinFaker;
pub use http::{ReqwestTransport, TransportOptions};
pub use sink::{FileSink, MemorySink, StdoutSink};
pub use template_loader::{TemplateDocument, TomlTemplateRepository};
