//! Delimited-text output

use std::borrow::Cow;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::FormatError;
use crate::model::{Batch, HeaderSet};

use super::{Formatter, Payload, PayloadKind};

/// Delimited-text formatter.
///
/// The header line goes out with the first batch only. Later batches render
/// against the grown header set, so columns discovered after the first batch
/// appear as extra trailing fields with no header cell. Earlier lines are
/// never rewritten.
///
/// With no known columns there is nothing to render: no header line and no
/// row lines.
pub struct CsvOutput {
    delimiter: u8,
}

impl CsvOutput {
    pub fn new() -> Self {
        Self { delimiter: b',' }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl Default for CsvOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvOutput {
    fn render(
        &self,
        headers: &HeaderSet,
        batch: Batch,
        first_batch: bool,
    ) -> Result<Payload, FormatError> {
        if headers.is_empty() {
            return Ok(Payload::Bytes(Vec::new()));
        }

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(Terminator::CRLF)
            .quote_style(QuoteStyle::Necessary)
            .flexible(true)
            .from_writer(Vec::new());

        if first_batch {
            writer.write_record(headers.iter())?;
        }

        for row in &batch.rows {
            let fields: Vec<Cow<'_, str>> = headers
                .iter()
                .map(|name| row.get(name).map(|v| v.display()).unwrap_or(Cow::Borrowed("")))
                .collect();
            writer.write_record(fields.iter().map(|f| f.as_bytes()))?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(Payload::Bytes(bytes))
    }

    fn payload_kind(&self) -> PayloadKind {
        PayloadKind::Bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CellValue, Row, SchemaAccumulator};

    fn text(payload: Payload) -> String {
        match payload {
            Payload::Bytes(b) => String::from_utf8(b).unwrap(),
            Payload::Records(_) => panic!("expected bytes"),
        }
    }

    #[test]
    fn test_header_only_on_first_batch() {
        let mut acc = SchemaAccumulator::new();
        let first = Row::new().with("id", 1i64).with("name", "a");
        acc.observe(&first);
        let out = CsvOutput::new();

        let one = text(out.render(acc.headers(), Batch::new(1, vec![first]), true).unwrap());
        assert_eq!(one, "id,name\r\n1,a\r\n");

        let second = Row::new().with("id", 2i64).with("name", "b").with("extra", "x");
        acc.observe(&second);
        let two = text(out.render(acc.headers(), Batch::new(2, vec![second]), false).unwrap());
        // `extra` gets a field but no header cell
        assert_eq!(two, "2,b,x\r\n");
    }

    #[test]
    fn test_no_columns_renders_nothing() {
        let mut acc = SchemaAccumulator::new();
        let empty = Row::new();
        acc.observe(&empty);

        let payload = CsvOutput::new()
            .render(acc.headers(), Batch::new(1, vec![empty]), true)
            .unwrap();
        assert_eq!(text(payload), "");
    }

    #[test]
    fn test_missing_columns_render_empty() {
        let mut acc = SchemaAccumulator::new();
        let rows = vec![
            Row::new().with("a", 1i64).with("b", "x"),
            Row::new().with("b", "y").with("c", CellValue::Null),
        ];
        for r in &rows {
            acc.observe(r);
        }
        let payload = CsvOutput::new()
            .render(acc.headers(), Batch::new(1, rows), true)
            .unwrap();
        assert_eq!(text(payload), "a,b,c\r\n1,x,\r\n,y,\r\n");
    }

    #[test]
    fn test_quotes_embedded_json_and_delimiters() {
        let mut acc = SchemaAccumulator::new();
        let row = Row::new()
            .with("meta", r#"{"a":1,"b":"q"}"#)
            .with("note", "semi;colon");
        acc.observe(&row);

        let comma = CsvOutput::new()
            .render(acc.headers(), Batch::new(1, vec![row.clone()]), false)
            .unwrap();
        assert_eq!(text(comma), "\"{\"\"a\"\":1,\"\"b\"\":\"\"q\"\"}\",semi;colon\r\n");

        let semi = CsvOutput::new()
            .with_delimiter(b';')
            .render(acc.headers(), Batch::new(1, vec![row]), false)
            .unwrap();
        assert_eq!(text(semi), "\"{\"\"a\"\":1,\"\"b\"\":\"\"q\"\"}\";\"semi;colon\"\r\n");
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut acc = SchemaAccumulator::new();
        let row = Row::new().with("k", 3.25f64).with("flag", false);
        acc.observe(&row);
        let out = CsvOutput::new();
        let a = out.render(acc.headers(), Batch::new(1, vec![row.clone()]), true).unwrap();
        let b = out.render(acc.headers(), Batch::new(1, vec![row]), true).unwrap();
        assert_eq!(a, b);
    }
}
