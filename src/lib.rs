//! dynaexport - Stream paginated key-value table scans to CSV, JSON, or callbacks
//!
//! The table's column set is discovered page by page while rows are
//! streamed out, so no schema is needed up front and no more than one page
//! of rows is held in memory.

pub mod config;
pub mod engine;
pub mod error;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod output;
pub mod sink;

pub use config::{ExportConfig, OutputFormat};
pub use engine::{CancelFlag, EngineState, ExtractionEngine, RowTransform, RunSummary};
pub use error::ExtractError;
pub use sink::SinkTarget;
