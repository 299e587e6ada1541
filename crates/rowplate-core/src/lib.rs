//! rowplate core - template expansion over table rows.
//!
//! This crate provides the domain and application layers shared by the
//! file builder and the HTTP sender, following hexagonal (ports and
//! adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          rowplate-cli (CLI)             │
//! │       build / send / validate           │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  FileBuilder, HttpSender, Validator,    │
//! │  Worker (background runs)               │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  FakeData, HttpTransport, ByteSink,     │
//! │  TemplateRepository                     │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    rowplate-adapters (Infrastructure)   │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  Templates, Params, RowTable,           │
//! │  placeholder substitution               │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use rowplate_core::prelude::*;
//! # fn faker() -> Arc<dyn FakeDataProvider> { unimplemented!() }
//!
//! let template = LineTemplate::builder()
//!     .name("insert")
//!     .pattern("INSERT INTO fruit VALUES ('${_csv0}', ${_csv1});")
//!     .build()
//!     .unwrap();
//! let table = RowTable::parse("apple,8\nbanana,3", CellDelimiter::Any);
//!
//! let builder = FileBuilder::new(ParamResolver::new(faker()));
//! let mut out = Vec::new();
//! builder.render_to(&template, &table, &mut out, true).unwrap();
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BatchRequestQueue, BuildSummary, CancellationToken, Credentials, FileBuilder,
        HttpSender, LogRecord, Outcome, ParamResolver, Progress, RecordIterator, RunEvent,
        RunHandle, SendOptions, SendReport, TemplateService, Validator, Worker,
        ports::{ByteSink, FakeDataProvider, HttpTransport, TemplateRepository},
    };
    pub use crate::domain::{
        Batch, CellDelimiter, Encoding, HttpMethod, LineSeparator, LineTemplate, Param,
        ParamSet, ParamType, Request, RequestTemplate, Response, RowTable, ValidationReport,
    };
    pub use crate::error::{RowplateError, RowplateResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
