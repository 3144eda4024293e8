//! Aggregate JSON output

use crate::error::FormatError;
use crate::model::{Batch, HeaderSet};

use super::{Formatter, Payload, PayloadKind};

/// JSON output formatter.
///
/// Each batch becomes one array of row objects terminated by a newline, so a
/// file holds one array per delivered page.
#[derive(Debug, Default)]
pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Formatter for JsonOutput {
    fn render(
        &self,
        _headers: &HeaderSet,
        batch: Batch,
        _first_batch: bool,
    ) -> Result<Payload, FormatError> {
        let mut bytes = serde_json::to_vec(&batch.rows)?;
        bytes.push(b'\n');
        Ok(Payload::Bytes(bytes))
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Bytes
    }
}
