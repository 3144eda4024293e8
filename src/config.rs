//! Configuration handling for dynaexport

use std::num::NonZeroU32;

use crate::error::ConfigError;
use crate::model::{Expression, QuerySpec};
use crate::sink::DEFAULT_HIGH_WATER_MARK;

/// Output format for extracted rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Delimited text with a one-time header line
    #[default]
    Csv,
    /// One JSON array per page
    Json,
    /// Structured rows for callback consumers
    Records,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" | "delimited" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "records" | "raw" => Ok(OutputFormat::Records),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

/// Configuration for one extraction run
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// What to read
    pub query: QuerySpec,
    /// Output format
    pub format: OutputFormat,
    /// Field delimiter for delimited text
    pub delimiter: u8,
    /// Buffered bytes at which a stream sink reports backpressure
    pub high_water_mark: usize,
}

impl ExportConfig {
    /// Create a config for a table with default settings
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            query: QuerySpec::new(table_name),
            format: OutputFormat::default(),
            delimiter: b',',
            high_water_mark: DEFAULT_HIGH_WATER_MARK,
        }
    }

    /// Read through a secondary index
    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.query.index = Some(index.into());
        self
    }

    /// Set the per-page item limit; zero falls back to the default
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        if let Some(limit) = NonZeroU32::new(limit) {
            self.query.page_limit = limit;
        }
        self
    }

    /// Set output format
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the delimited-text field separator
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Query by key condition instead of scanning
    pub fn with_key_condition(mut self, condition: Expression) -> Self {
        self.query.key_condition = Some(condition);
        self
    }

    /// Filter items on the store side
    pub fn with_filter(mut self, filter: Expression) -> Self {
        self.query.filter = Some(filter);
        self
    }

    /// Set the stream sink high-water mark in bytes
    pub fn with_high_water_mark(mut self, bytes: usize) -> Self {
        self.high_water_mark = bytes;
        self
    }

    /// Check the config before any request is made
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.table_name.trim().is_empty() {
            return Err(ConfigError::EmptyTableName);
        }
        if self.high_water_mark == 0 {
            return Err(ConfigError::ZeroHighWaterMark);
        }
        Ok(())
    }
}

/// Parse a page limit, rejecting zero
pub fn parse_page_limit(s: &str) -> Result<u32, ConfigError> {
    match s.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::ZeroPageLimit),
    }
}
