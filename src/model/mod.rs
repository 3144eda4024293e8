//! Data model for extraction runs

mod query;
mod row;
mod schema;

pub use query::{ContinuationToken, Expression, QuerySpec, DEFAULT_PAGE_LIMIT};
pub use row::{Batch, CellValue, RawItem, Row};
pub use schema::{HeaderSet, SchemaAccumulator};
