use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::ports::OutputSink;

/// In-memory sink that a measurement reads and resets between samples.
#[derive(Debug, Default)]
pub struct SharedBuffer {
    bytes: Mutex<Vec<u8>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        self.bytes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Everything written since the last reset, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.lock()).into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn reset(&self) {
        self.lock().clear();
    }
}

impl OutputSink for SharedBuffer {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        self.lock().extend_from_slice(bytes);
        Ok(())
    }
}

/// Which process-wide stream a [`ConsoleSink`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleStream {
    Stdout,
    Stderr,
}

/// Sink forwarding to this process's stdout or stderr.
///
/// Each write holds the stream lock for the whole chunk, so output of
/// concurrent commands interleaves by chunk rather than by byte.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleSink {
    stream: ConsoleStream,
}

impl ConsoleSink {
    pub const fn stdout() -> Self {
        Self {
            stream: ConsoleStream::Stdout,
        }
    }

    pub const fn stderr() -> Self {
        Self {
            stream: ConsoleStream::Stderr,
        }
    }
}

impl OutputSink for ConsoleSink {
    fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        match self.stream {
            ConsoleStream::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()
            }
            ConsoleStream::Stderr => {
                let mut err = io::stderr().lock();
                err.write_all(bytes)?;
                err.flush()
            }
        }
    }
}

/// Private stdout/stderr pair owned by one measurement.
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput {
    stdout: Arc<SharedBuffer>,
    stderr: Arc<SharedBuffer>,
}

impl CapturedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout_sink(&self) -> Arc<dyn OutputSink> {
        self.stdout.clone()
    }

    pub fn stderr_sink(&self) -> Arc<dyn OutputSink> {
        self.stderr.clone()
    }

    pub fn stdout(&self) -> String {
        self.stdout.contents()
    }

    pub fn stderr(&self) -> String {
        self.stderr.contents()
    }

    pub fn reset(&self) {
        self.stdout.reset();
        self.stderr.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_buffer_accumulates_and_resets() {
        let buffer = SharedBuffer::new();
        buffer.write_all(b"hello ").unwrap();
        buffer.write_all(b"world").unwrap();
        assert_eq!(buffer.contents(), "hello world");

        buffer.reset();
        assert!(buffer.is_empty());
        assert_eq!(buffer.contents(), "");
    }

    #[test]
    fn test_concurrent_writes_keep_every_chunk() {
        let buffer = Arc::new(SharedBuffer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let buffer = buffer.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        buffer.write_all(b"ab").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let contents = buffer.contents();
        assert_eq!(contents.len(), 1600);
        assert_eq!(contents.matches("ab").count(), 800);
    }

    #[test]
    fn test_captured_output_splits_streams() {
        let output = CapturedOutput::new();
        output.stdout_sink().write_all(b"out").unwrap();
        output.stderr_sink().write_all(b"err").unwrap();

        assert_eq!(output.stdout(), "out");
        assert_eq!(output.stderr(), "err");

        output.reset();
        assert_eq!(output.stdout(), "");
        assert_eq!(output.stderr(), "");
    }
}
