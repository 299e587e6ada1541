//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `rowplate-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `FakeDataProvider`: fake-data expression evaluation
//!   - `HttpTransport`: sends one rendered request
//!   - `ByteSink`: destination of generated file bytes
//!   - `TemplateRepository`: where templates come from

pub mod output;

pub use output::{ByteSink, FakeDataProvider, HttpTransport, TemplateRepository};
