//! Byte-stream sink with a buffered high-water mark

use std::io::{self, Write};

use tracing::debug;

use crate::error::SinkError;
use crate::output::{Payload, PayloadKind};

use super::Sink;

/// Buffers whole payloads and reports backpressure once the buffer reaches
/// the high-water mark. `drain` writes the buffer through and flushes.
///
/// A failed write keeps only the bytes the stream has not taken yet, so a
/// later `drain` or `finish` resumes where the stream stopped.
pub struct StreamSink<W: Write> {
    writer: W,
    buffer: Vec<u8>,
    high_water_mark: usize,
    bytes_written: u64,
}

impl<W: Write> StreamSink<W> {
    pub fn new(writer: W, high_water_mark: usize) -> Self {
        Self {
            writer,
            buffer: Vec::new(),
            high_water_mark: high_water_mark.max(1),
            bytes_written: 0,
        }
    }

    /// Bytes accepted but not yet written through
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Bytes written through to the underlying stream
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Sink for StreamSink<W> {
    fn deliver(&mut self, payload: Payload) -> Result<(), SinkError> {
        match payload {
            Payload::Bytes(bytes) => {
                self.buffer.extend_from_slice(&bytes);
                Ok(())
            }
            other => Err(SinkError::UnsupportedPayload(other.kind())),
        }
    }

    fn backpressure(&self) -> bool {
        self.buffer.len() >= self.high_water_mark
    }

    fn drain(&mut self) -> Result<(), SinkError> {
        if !self.buffer.is_empty() {
            let (written, result) = write_prefix(&mut self.writer, &self.buffer);
            self.buffer.drain(..written);
            self.bytes_written += written as u64;
            debug!(bytes = written, total = self.bytes_written, "drained stream sink");
            result?;
        }
        self.writer.flush()?;
        Ok(())
    }

    fn accepts(&self, kind: PayloadKind) -> bool {
        kind == PayloadKind::Bytes
    }
}

/// Like `write_all`, but also reports how many bytes went through
fn write_prefix<W: Write>(writer: &mut W, buf: &[u8]) -> (usize, io::Result<()>) {
    let mut written = 0;
    while written < buf.len() {
        match writer.write(&buf[written..]) {
            Ok(0) => return (written, Err(io::ErrorKind::WriteZero.into())),
            Ok(n) => written += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return (written, Err(e)),
        }
    }
    (written, Ok(()))
}
