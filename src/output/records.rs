//! Structured row pass-through

use crate::error::FormatError;
use crate::model::{Batch, HeaderSet};

use super::{Formatter, Payload, PayloadKind};

/// Hands rows to the sink unchanged, for callback consumers
pub struct RecordsOutput;

impl Formatter for RecordsOutput {
    fn render(
        &self,
        _headers: &HeaderSet,
        batch: Batch,
        _first_batch: bool,
    ) -> Result<Payload, FormatError> {
        Ok(Payload::Records(batch.rows))
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Records
    }
}
