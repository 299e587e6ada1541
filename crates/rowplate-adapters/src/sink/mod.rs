//! Byte sink adapters.

mod file;
mod memory;

pub use file::{FileSink, StdoutSink};
pub use memory::MemorySink;
