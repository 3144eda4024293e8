//! Extraction engine: fetch, normalize, accumulate, transform, format, deliver
//!
//! One run walks the table page by page in a single loop driven by the
//! continuation token. Page N+1 is never requested before page N has been
//! handed to the sink and any backpressure has cleared, so at most one page
//! of rows is alive at a time.

mod cancel;
mod transform;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::error::{ExtractError, SinkConfigError};
use crate::fetch::PageFetcher;
use crate::model::{Batch, ContinuationToken, HeaderSet, Row, SchemaAccumulator};
use crate::normalize::normalize_item;
use crate::output::{Formatter, FormatterFactory};
use crate::sink::{Sink, SinkTarget};

pub use cancel::CancelFlag;
pub use transform::RowTransform;

/// Where a run is in its loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Fetching,
    Normalizing,
    Accumulating,
    Formatting,
    Delivering,
    Done,
    Failed,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EngineState::Idle => "idle",
            EngineState::Fetching => "fetching",
            EngineState::Normalizing => "normalizing",
            EngineState::Accumulating => "accumulating",
            EngineState::Formatting => "formatting",
            EngineState::Delivering => "delivering",
            EngineState::Done => "done",
            EngineState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Totals for a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub pages_fetched: usize,
    pub rows_delivered: usize,
    pub payloads_delivered: usize,
    /// Times the engine waited for the sink to drain
    pub drains: usize,
    /// Final header order
    pub columns: Vec<String>,
    pub elapsed: Duration,
}

/// Builder for [`ExtractionEngine`]
pub struct EngineBuilder<'a> {
    config: ExportConfig,
    fetcher: Box<dyn PageFetcher + 'a>,
    sink: Option<SinkTarget<'a>>,
    transform: Option<Box<dyn RowTransform + 'a>>,
    cancel: CancelFlag,
}

impl<'a> EngineBuilder<'a> {
    /// Set the output target, replacing any earlier one
    pub fn sink(mut self, target: SinkTarget<'a>) -> Self {
        self.sink = Some(target);
        self
    }

    /// Install a per-row transform hook
    pub fn transform(mut self, hook: impl RowTransform + 'a) -> Self {
        self.transform = Some(Box::new(hook));
        self
    }

    /// Use an externally owned cancel flag
    pub fn cancel_flag(mut self, flag: CancelFlag) -> Self {
        self.cancel = flag;
        self
    }

    /// Validate the config and open the sink. No request is made here.
    pub fn build(self) -> Result<ExtractionEngine<'a>, ExtractError> {
        self.config.validate()?;
        let formatter = FormatterFactory::create(self.config.format, self.config.delimiter);
        let target = self.sink.ok_or(SinkConfigError::Missing)?;
        let sink = target.open(formatter.payload_kind(), self.config.high_water_mark)?;

        Ok(ExtractionEngine {
            config: self.config,
            fetcher: self.fetcher,
            formatter,
            sink,
            transform: self.transform,
            cancel: self.cancel,
            schema: SchemaAccumulator::new(),
            state: EngineState::Idle,
            write_count: 0,
            header_written: false,
        })
    }
}

/// Drives one extraction run
pub struct ExtractionEngine<'a> {
    config: ExportConfig,
    fetcher: Box<dyn PageFetcher + 'a>,
    formatter: Box<dyn Formatter>,
    sink: Box<dyn Sink + 'a>,
    transform: Option<Box<dyn RowTransform + 'a>>,
    cancel: CancelFlag,
    schema: SchemaAccumulator,
    state: EngineState,
    /// Rows delivered so far
    write_count: usize,
    /// Set once a batch has been rendered against a non-empty header set
    header_written: bool,
}

#[derive(Default)]
struct Progress {
    pages: usize,
    payloads: usize,
    drains: usize,
}

impl<'a> ExtractionEngine<'a> {
    /// Start building an engine for `config`, reading through `fetcher`
    pub fn builder(config: ExportConfig, fetcher: impl PageFetcher + 'a) -> EngineBuilder<'a> {
        EngineBuilder {
            config,
            fetcher: Box::new(fetcher),
            sink: None,
            transform: None,
            cancel: CancelFlag::new(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn headers(&self) -> &HeaderSet {
        self.schema.headers()
    }

    /// Rows delivered to the sink so far
    pub fn rows_delivered(&self) -> usize {
        self.write_count
    }

    /// Handle for cancelling this run from elsewhere
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Run to completion.
    ///
    /// On failure, output of pages already delivered stays delivered and is
    /// flushed; the failing page contributes nothing.
    pub fn run(&mut self) -> Result<RunSummary, ExtractError> {
        if self.state != EngineState::Idle {
            return Err(ExtractError::AlreadyRun(self.state.to_string()));
        }

        let started = Instant::now();
        let table = self.config.query.table_name.clone();
        info!(
            table = %table,
            index = ?self.config.query.index,
            limit = self.config.query.page_limit.get(),
            format = ?self.config.format,
            "starting extraction"
        );

        let mut progress = Progress::default();
        let outcome = self.run_pages(&mut progress);
        let flushed = self.sink.finish();

        match (outcome, flushed) {
            (Ok(()), Ok(())) => {
                self.state = EngineState::Done;
                let summary = RunSummary {
                    pages_fetched: progress.pages,
                    rows_delivered: self.write_count,
                    payloads_delivered: progress.payloads,
                    drains: progress.drains,
                    columns: self.schema.headers().to_vec(),
                    elapsed: started.elapsed(),
                };
                info!(
                    table = %table,
                    pages = summary.pages_fetched,
                    rows = summary.rows_delivered,
                    columns = summary.columns.len(),
                    "extraction complete"
                );
                Ok(summary)
            }
            (Err(e), flushed) => {
                self.state = EngineState::Failed;
                if let Err(flush_err) = flushed {
                    warn!(error = %flush_err, "failed to flush delivered output");
                }
                warn!(
                    table = %table,
                    pages = progress.pages,
                    rows = self.write_count,
                    error = %e,
                    "extraction failed; output is truncated"
                );
                Err(e)
            }
            (Ok(()), Err(e)) => {
                self.state = EngineState::Failed;
                warn!(table = %table, error = %e, "final flush failed");
                Err(e.into())
            }
        }
    }

    fn run_pages(&mut self, progress: &mut Progress) -> Result<(), ExtractError> {
        let mut token: Option<ContinuationToken> = None;

        loop {
            if self.cancel.is_cancelled() {
                return Err(ExtractError::Cancelled {
                    pages: progress.pages,
                });
            }

            self.state = EngineState::Fetching;
            let page_no = progress.pages + 1;
            let page = self
                .fetcher
                .fetch_page(&self.config.query, token.as_ref())
                .map_err(|source| ExtractError::Fetch {
                    page: page_no,
                    source,
                })?;
            progress.pages = page_no;

            self.state = EngineState::Normalizing;
            let rows = page
                .items
                .iter()
                .map(normalize_item)
                .collect::<Result<Vec<Row>, _>>()
                .map_err(|source| ExtractError::MalformedItem {
                    page: page_no,
                    source,
                })?;
            drop(page.items);

            self.state = EngineState::Accumulating;
            let known = self.schema.headers().len();
            for row in &rows {
                self.schema.observe(row);
            }

            let rows = match self.transform.as_mut() {
                Some(hook) => rows
                    .into_iter()
                    .map(|row| hook.transform(row, &mut self.schema))
                    .collect::<Result<Vec<Row>, _>>()
                    .map_err(|source| ExtractError::Transform {
                        page: page_no,
                        source,
                    })?,
                None => rows,
            };

            let new_columns: Vec<&str> = self.schema.headers().iter().skip(known).collect();
            debug!(
                page = page_no,
                items = rows.len(),
                new_columns = ?new_columns,
                more = page.next_token.is_some(),
                "fetched page"
            );

            // Empty pages produce no payload, so the header waits for real rows
            if !rows.is_empty() {
                let count = rows.len();
                self.state = EngineState::Formatting;
                let payload = self.formatter.render(
                    self.schema.headers(),
                    Batch::new(page_no, rows),
                    !self.header_written,
                )?;
                // Attribute-less rows render no fields, so the header stays owed
                self.header_written |= !self.schema.headers().is_empty();

                self.state = EngineState::Delivering;
                self.sink.deliver(payload)?;
                self.write_count += count;
                progress.payloads += 1;

                if self.sink.backpressure() {
                    debug!(page = page_no, "sink backpressure, draining before next fetch");
                    self.sink.drain()?;
                    progress.drains += 1;
                }
            }

            match page.next_token {
                Some(next) => token = Some(next),
                None => return Ok(()),
            }
        }
    }
}
