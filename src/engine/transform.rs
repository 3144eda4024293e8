//! Per-row transform hook

use crate::error::TransformError;
use crate::model::{Row, SchemaAccumulator};

/// Hook run once per row after schema accumulation and before formatting.
///
/// The hook may replace or annotate the row. Columns it adds reach delimited
/// output only if it also registers them on `schema` (`append`/`prepend`).
/// Returning an error fails the run.
pub trait RowTransform {
    fn transform(&mut self, row: Row, schema: &mut SchemaAccumulator) -> Result<Row, TransformError>;
}

impl<F> RowTransform for F
where
    F: FnMut(Row, &mut SchemaAccumulator) -> Result<Row, TransformError>,
{
    fn transform(&mut self, row: Row, schema: &mut SchemaAccumulator) -> Result<Row, TransformError> {
        self(row, schema)
    }
}
