// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report sink shared by all reporters
//!
//! An [`Output`] is either a file opened at construction or the injected
//! stdout stream. It is closed exactly once: by the reporter's `done`, or on
//! drop if the run never got that far.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::debug;

use super::ReporterError;

/// Output shared between a reporter and its runner listeners
pub type SharedOutput = Rc<RefCell<Output>>;

enum Sink {
    File {
        path: PathBuf,
        writer: BufWriter<File>,
    },
    Stream(Box<dyn Write>),
}

impl Sink {
    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::File { writer, .. } => writer,
            Self::Stream(stream) => stream.as_mut(),
        }
    }
}

/// Exclusive report sink
pub struct Output {
    sink: Option<Sink>,
    error: Option<io::Error>,
}

impl Output {
    /// Open `path` for writing, or wrap `stdout` when no path is given
    ///
    /// # Errors
    ///
    /// Returns [`ReporterError::Unwritable`] if the file cannot be created.
    pub fn open(path: Option<&Path>, stdout: Box<dyn Write>) -> Result<Self, ReporterError> {
        let sink = match path {
            Some(path) => {
                let file = File::create(path).map_err(|source| ReporterError::Unwritable {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!(path = %path.display(), "writing report to file");
                Sink::File {
                    path: path.to_path_buf(),
                    writer: BufWriter::new(file),
                }
            }
            None => Sink::Stream(stdout),
        };
        Ok(Self {
            sink: Some(sink),
            error: None,
        })
    }

    /// Wrap an already-open stream
    #[must_use]
    pub fn stream(stdout: Box<dyn Write>) -> Self {
        Self {
            sink: Some(Sink::Stream(stdout)),
            error: None,
        }
    }

    /// Open and wrap for sharing with listeners
    ///
    /// # Errors
    ///
    /// See [`Output::open`].
    pub fn shared(path: Option<&Path>, stdout: Box<dyn Write>) -> Result<SharedOutput, ReporterError> {
        Ok(Rc::new(RefCell::new(Self::open(path, stdout)?)))
    }

    /// Write `text` followed by a newline
    pub fn write_line(&mut self, text: &str) {
        self.write_str(text);
        self.write_str("\n");
    }

    /// Write `text` as is
    ///
    /// The first write error is kept and reported by [`Output::close`]; later
    /// writes are dropped.
    pub fn write_str(&mut self, text: &str) {
        if self.error.is_some() {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            debug!("write after output was closed");
            return;
        };
        if let Err(err) = sink.writer().write_all(text.as_bytes()) {
            self.error = Some(err);
        }
    }

    /// Path of the report file, if writing to one
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match &self.sink {
            Some(Sink::File { path, .. }) => Some(path),
            _ => None,
        }
    }

    /// Whether [`Output::close`] has run
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sink.is_none()
    }

    /// Flush and release the sink
    ///
    /// Returns `Ok(false)` if the output was already closed.
    ///
    /// # Errors
    ///
    /// Returns the first write error, or the flush error.
    pub fn close(&mut self) -> Result<bool, ReporterError> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(false);
        };
        let flushed = sink.writer().flush();
        if let Sink::File { path, .. } = &sink {
            debug!(path = %path.display(), "closing report file");
        }
        drop(sink);
        if let Some(err) = self.error.take() {
            return Err(ReporterError::Io(err));
        }
        flushed?;
        Ok(true)
    }
}

impl Drop for Output {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.writer().flush();
        }
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Output")
            .field("path", &self.path())
            .field("closed", &self.is_closed())
            .field("error", &self.error)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    /// Stream whose contents stay readable after it is boxed
    #[derive(Clone, Default)]
    struct Captured(Rc<RefCell<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_stream_output() {
        let captured = Captured::default();
        let mut output = Output::stream(Box::new(captured.clone()));
        output.write_line("<a>");
        output.write_str("b");
        assert!(output.close().unwrap());
        assert_eq!(String::from_utf8_lossy(&captured.0.borrow()), "<a>\nb");
    }

    #[test]
    fn test_close_twice() {
        let mut output = Output::stream(Box::new(io::sink()));
        assert!(output.close().unwrap());
        assert!(!output.close().unwrap());
        assert!(output.is_closed());
    }

    #[test]
    fn test_write_after_close_is_dropped() {
        let captured = Captured::default();
        let mut output = Output::stream(Box::new(captured.clone()));
        output.close().unwrap();
        output.write_line("late");
        assert!(captured.0.borrow().is_empty());
    }

    #[test]
    fn test_first_write_error_surfaces_on_close() {
        let mut output = Output::stream(Box::new(Broken));
        output.write_line("lost");
        assert!(matches!(output.close(), Err(ReporterError::Io(_))));
    }

    #[test]
    fn test_file_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.xml");
        let mut output = Output::open(Some(&path), Box::new(io::sink())).unwrap();
        assert_eq!(output.path(), Some(path.as_path()));
        output.write_line("hello");
        output.close().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello\n");
    }

    #[test]
    fn test_unwritable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("report.xml");
        let result = Output::open(Some(&path), Box::new(io::sink()));
        assert!(matches!(result, Err(ReporterError::Unwritable { .. })));
    }
}
