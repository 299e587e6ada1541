//! Templates: the shape of one output unit.
//!
//! - [`LineTemplate`] drives the file builder (one text line per row).
//! - [`RequestTemplate`] drives the HTTP sender (one request per row, or per
//!   group of rows in batch mode).
//!
//! Both are plain data with serde support; a run clones the template into
//! an `Arc` snapshot and never mutates the caller's value.

pub mod line;
pub mod request;

pub use line::{LineTemplate, LineTemplateBuilder};
pub use request::{Batch, RequestTemplate, RequestTemplateBuilder, parse_headers};

/// `Some(text)` only when the text is not blank.
fn non_blank(text: Option<&String>) -> Option<&str> {
    text.map(String::as_str).filter(|t| !t.trim().is_empty())
}
