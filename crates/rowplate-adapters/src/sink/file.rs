//! File and stdout sinks using std::fs / std::io.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rowplate_core::{
    application::{ApplicationError, ports::ByteSink},
    error::{RowplateError, RowplateResult},
};

/// Writes generated lines to a file.
///
/// A fresh sink truncates the file; an appending sink keeps its content and
/// never writes a byte-order mark.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    append: bool,
}

impl FileSink {
    /// Create or truncate `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: false,
        }
    }

    /// Append to `path`, creating it when missing.
    pub fn append(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ByteSink for FileSink {
    fn open(&self) -> RowplateResult<Box<dyn Write + Send>> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| map_io_error(parent, e, "create directory"))?;
            }
        }

        let mut options = OpenOptions::new();
        options.create(true);
        if self.append {
            options.append(true);
        } else {
            options.write(true).truncate(true);
        }
        let file = options
            .open(&self.path)
            .map_err(|e| map_io_error(&self.path, e, "open output file"))?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn appends(&self) -> bool {
        self.append
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Writes generated lines to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutSink;

impl ByteSink for StdoutSink {
    fn open(&self) -> RowplateResult<Box<dyn Write + Send>> {
        Ok(Box::new(BufWriter::new(io::stdout())))
    }

    fn appends(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        "<stdout>".into()
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> RowplateError {
    ApplicationError::Io {
        context: format!("{operation} '{}'", path.display()),
        reason: e.to_string(),
    }
    .into()
}
