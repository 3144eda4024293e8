//! Batch rendering for the supported output formats

mod csv;
mod json;
mod records;

use crate::config::OutputFormat;
use crate::error::FormatError;
use crate::model::{Batch, HeaderSet, Row};

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::records::RecordsOutput;

/// A rendered batch, ready for a sink
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Encoded text for byte-stream sinks
    Bytes(Vec<u8>),
    /// Structured rows for in-memory consumers
    Records(Vec<Row>),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Bytes(_) => PayloadKind::Bytes,
            Payload::Records(_) => PayloadKind::Records,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Bytes(b) => Some(b),
            Payload::Records(_) => None,
        }
    }

    pub fn as_records(&self) -> Option<&[Row]> {
        match self {
            Payload::Records(rows) => Some(rows),
            Payload::Bytes(_) => None,
        }
    }
}

/// Shape of the payloads a formatter produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Bytes,
    Records,
}

impl std::fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PayloadKind::Bytes => write!(f, "byte"),
            PayloadKind::Records => write!(f, "record"),
        }
    }
}

/// Trait for batch formatters.
///
/// Rendering is deterministic: identical headers, rows, and `first_batch`
/// give identical payloads. `first_batch` stays true until a batch has been
/// rendered against a non-empty header set.
pub trait Formatter: Send + Sync {
    /// Render one batch against the current header snapshot
    fn render(
        &self,
        headers: &HeaderSet,
        batch: Batch,
        first_batch: bool,
    ) -> Result<Payload, FormatError>;

    /// Kind of payload every `render` call returns
    fn payload_kind(&self) -> PayloadKind;
}

/// Factory for creating formatters
pub struct FormatterFactory;

impl FormatterFactory {
    /// Create a formatter for the output format
    pub fn create(format: OutputFormat, delimiter: u8) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Csv => Box::new(CsvOutput::new().with_delimiter(delimiter)),
            OutputFormat::Json => Box::new(JsonOutput::new()),
            OutputFormat::Records => Box::new(RecordsOutput),
        }
    }
}
