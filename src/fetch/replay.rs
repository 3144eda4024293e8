//! Transport that replays recorded response bodies

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

use super::dynamo::{Operation, Transport};

/// Serves one recorded response body per request, reading the source lazily.
///
/// The source holds one JSON response per line, as captured from the store.
/// Blank lines are skipped.
pub struct ReplayTransport<R> {
    lines: Lines<R>,
    served: usize,
}

impl ReplayTransport<BufReader<File>> {
    /// Replay responses from a JSON-lines file
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayTransport<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            served: 0,
        }
    }

    /// Number of responses handed out so far
    pub fn served(&self) -> usize {
        self.served
    }
}

impl<R: BufRead + Send> Transport for ReplayTransport<R> {
    fn send(&mut self, operation: Operation, _body: &Value) -> Result<String, FetchError> {
        loop {
            match self.lines.next() {
                Some(Ok(line)) if line.trim().is_empty() => continue,
                Some(Ok(line)) => {
                    self.served += 1;
                    debug!(target: "dynaexport::replay", %operation, response = self.served, "replaying response");
                    return Ok(line);
                }
                Some(Err(e)) => return Err(FetchError::Transport(e.to_string())),
                None => {
                    return Err(FetchError::Transport(format!(
                        "replay exhausted after {} response(s)",
                        self.served
                    )))
                }
            }
        }
    }
}
