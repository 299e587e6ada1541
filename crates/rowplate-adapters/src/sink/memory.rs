//! In-memory sink for testing.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use rowplate_core::{
    application::{ApplicationError, ports::ByteSink},
    error::RowplateResult,
};

/// Collects written bytes in a shared buffer.
///
/// Clones share the buffer, so a test can hand one clone to a run and read
/// the output from another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
    append: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink that behaves like an append target (no byte-order mark).
    pub fn appending() -> Self {
        Self {
            append: true,
            ..Self::default()
        }
    }

    /// Copy of everything written so far.
    pub fn bytes(&self) -> Vec<u8> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Written bytes as UTF-8, lossily.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.bytes()).into_owned()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

struct MemoryWriter(Arc<Mutex<Vec<u8>>>);

impl Write for MemoryWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut buffer = self
            .0
            .lock()
            .map_err(|_| io::Error::other("memory sink lock poisoned"))?;
        buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ByteSink for MemorySink {
    fn open(&self) -> RowplateResult<Box<dyn Write + Send>> {
        if !self.append {
            self.buffer
                .lock()
                .map_err(|_| ApplicationError::LockPoisoned)?
                .clear();
        }
        Ok(Box::new(MemoryWriter(Arc::clone(&self.buffer))))
    }

    fn appends(&self) -> bool {
        self.append
    }

    fn describe(&self) -> String {
        "<memory>".into()
    }
}
