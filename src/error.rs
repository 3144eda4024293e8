//! Error types for dynaexport
//!
//! Every failure category of an extraction run is fatal for that run. The
//! top-level [`ExtractError`] wraps the category-specific errors below so the
//! caller can tell a broken store response from a broken sink.

use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::output::PayloadKind;

/// Boxed error used for caller-supplied hooks and transports
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Top-level error for an extraction run
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Invalid configuration, raised before any fetch
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Sink could not be built, raised before any fetch
    #[error("Sink configuration error: {0}")]
    SinkConfig(#[from] SinkConfigError),

    /// A page request failed; no rows from that page were delivered
    #[error("Fetch of page {page} failed: {source}")]
    Fetch {
        page: usize,
        #[source]
        source: FetchError,
    },

    /// A fetched item carried an unrecognized or malformed type tag
    #[error("Malformed item on page {page}: {source}")]
    MalformedItem {
        page: usize,
        #[source]
        source: MalformedItemError,
    },

    /// The row transform hook returned an error
    #[error("Row transform failed on page {page}: {source}")]
    Transform {
        page: usize,
        #[source]
        source: TransformError,
    },

    /// A batch could not be rendered
    #[error("Format error: {0}")]
    Format(#[from] FormatError),

    /// The sink rejected or failed to write a payload
    #[error("Delivery error: {0}")]
    Delivery(#[from] SinkError),

    /// The cancel flag was raised before a fetch
    #[error("Extraction cancelled after {pages} page(s)")]
    Cancelled { pages: usize },

    /// `run` was called on an engine that already ran
    #[error("Engine already ran (state: {0})")]
    AlreadyRun(String),
}

/// Configuration validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("table name must not be empty")]
    EmptyTableName,

    #[error("page limit must be a positive integer")]
    ZeroPageLimit,

    #[error("high-water mark must be a positive number of bytes")]
    ZeroHighWaterMark,
}

/// Errors raised while building the sink
#[derive(Error, Debug)]
pub enum SinkConfigError {
    /// Neither a stream, a path, nor a callback was supplied
    #[error("no sink target configured: supply a path, a writer, or a callback")]
    Missing,

    /// The output format produces payloads the target cannot accept
    #[error("{kind} payloads cannot be delivered to a {target} sink")]
    UnsupportedFormat {
        kind: PayloadKind,
        target: &'static str,
    },

    /// The output path could not be opened for appending
    #[error("failed to open '{}' for appending: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Page request errors surfaced by a [`PageFetcher`](crate::fetch::PageFetcher)
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network or service failure reported by the transport
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered with something that is not a valid page
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Normalization errors for a single attribute
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedItemError {
    #[error("attribute '{attribute}' is not a single-entry type-tagged object")]
    NotTagged { attribute: String },

    #[error("attribute '{attribute}' has unknown type tag '{tag}'")]
    UnknownTag { attribute: String, tag: String },

    #[error("attribute '{attribute}' has a '{tag}' payload of the wrong shape")]
    BadPayload { attribute: String, tag: String },
}

/// Failure reported by a row transform hook
#[derive(Error, Debug)]
#[error("{source}")]
pub struct TransformError {
    #[source]
    source: BoxError,
}

impl TransformError {
    /// Wrap any error or message as a transform failure
    pub fn new(source: impl Into<BoxError>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Rendering errors
#[derive(Error, Debug)]
pub enum FormatError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivery errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("callback failed: {0}")]
    Callback(BoxError),

    #[error("{0} payloads are not accepted by this sink")]
    UnsupportedPayload(PayloadKind),
}
