//! Payload delivery

mod callback;
mod stream;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use crate::error::{BoxError, SinkConfigError, SinkError};
use crate::output::{Payload, PayloadKind};

pub use self::callback::CallbackSink;
pub use self::stream::StreamSink;

/// Default buffered bytes above which a stream sink asks to be drained
pub const DEFAULT_HIGH_WATER_MARK: usize = 16 * 1024;

/// Destination for rendered batches
pub trait Sink {
    /// Accept one whole payload
    fn deliver(&mut self, payload: Payload) -> Result<(), SinkError>;

    /// True while the sink wants no more payloads until drained
    fn backpressure(&self) -> bool {
        false
    }

    /// Block until buffered output reaches the destination
    fn drain(&mut self) -> Result<(), SinkError> {
        Ok(())
    }

    /// Flush everything; called once when the run ends, success or not
    fn finish(&mut self) -> Result<(), SinkError> {
        self.drain()
    }

    /// Whether payloads of this kind can be delivered
    fn accepts(&self, kind: PayloadKind) -> bool;
}

/// Callback receiving one payload per delivered page
pub type PayloadCallback<'a> = Box<dyn FnMut(Payload) -> Result<(), BoxError> + 'a>;

/// Where a run's output goes. Exactly one variant is chosen per run.
pub enum SinkTarget<'a> {
    /// File opened in create+append mode when the engine is built
    Path(PathBuf),
    /// Caller-supplied byte stream
    Writer(Box<dyn Write + 'a>),
    /// Caller-supplied push callback
    Callback(PayloadCallback<'a>),
}

impl<'a> SinkTarget<'a> {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        SinkTarget::Path(path.into())
    }

    pub fn writer(writer: impl Write + 'a) -> Self {
        SinkTarget::Writer(Box::new(writer))
    }

    pub fn callback<F>(callback: F) -> Self
    where
        F: FnMut(Payload) -> Result<(), BoxError> + 'a,
    {
        SinkTarget::Callback(Box::new(callback))
    }

    fn describe(&self) -> &'static str {
        match self {
            SinkTarget::Path(_) => "file",
            SinkTarget::Writer(_) => "stream",
            SinkTarget::Callback(_) => "callback",
        }
    }

    /// Build the sink, checking it can take payloads of `kind`
    pub fn open(
        self,
        kind: PayloadKind,
        high_water_mark: usize,
    ) -> Result<Box<dyn Sink + 'a>, SinkConfigError> {
        let target = self.describe();
        let sink: Box<dyn Sink + 'a> = match self {
            SinkTarget::Path(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .map_err(|source| SinkConfigError::Open { path, source })?;
                Box::new(StreamSink::new(file, high_water_mark))
            }
            SinkTarget::Writer(writer) => Box::new(StreamSink::new(writer, high_water_mark)),
            SinkTarget::Callback(callback) => Box::new(CallbackSink::new(callback)),
        };

        if !sink.accepts(kind) {
            return Err(SinkConfigError::UnsupportedFormat { kind, target });
        }
        Ok(sink)
    }
}

impl std::fmt::Debug for SinkTarget<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SinkTarget::Path(path) => f.debug_tuple("Path").field(path).finish(),
            SinkTarget::Writer(_) => f.write_str("Writer(..)"),
            SinkTarget::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}
