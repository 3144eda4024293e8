//! dynaexport - export a recorded table scan to CSV or JSON

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde_json::{Map, Value};
use tracing::info;
use tracing_subscriber::EnvFilter;

use dynaexport::config::{parse_page_limit, ExportConfig, OutputFormat};
use dynaexport::fetch::{DynamoFetcher, ReplayTransport};
use dynaexport::model::Expression;
use dynaexport::{CancelFlag, ExtractionEngine, SinkTarget};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Csv,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Export a paginated table scan or query to CSV or JSON
#[derive(Parser, Debug)]
#[command(name = "dynaexport")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Table to export
    #[arg(short, long)]
    table: String,

    /// Recorded store responses, one JSON body per line
    #[arg(long)]
    replay: PathBuf,

    /// Secondary index to read through
    #[arg(short, long)]
    index: Option<String>,

    /// Items per page
    #[arg(short, long, default_value = "2000", value_parser = parse_limit)]
    limit: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "csv")]
    format: CliOutputFormat,

    /// Field delimiter for CSV output
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// Append output to this file instead of writing to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Key condition expression (switches from scan to query)
    #[arg(long)]
    key_condition: Option<String>,

    /// Filter expression
    #[arg(long)]
    filter: Option<String>,

    /// Expression attribute values as a JSON object of type-tagged values
    #[arg(long)]
    values: Option<String>,

    /// Expression attribute names as a JSON object
    #[arg(long)]
    names: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn parse_limit(s: &str) -> Result<u32, String> {
    parse_page_limit(s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    if !cli.delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character");
    }

    let config = build_config(&cli)?;

    let transport = ReplayTransport::open(&cli.replay)
        .with_context(|| format!("Failed to open replay file: {}", cli.replay.display()))?;

    let target = match &cli.output {
        Some(path) => SinkTarget::path(path),
        None => SinkTarget::writer(io::stdout().lock()),
    };

    let cancel = CancelFlag::new();
    let handler_flag = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, stopping after the current page...");
        handler_flag.cancel();
    })
    .context("Failed to set signal handler")?;

    let mut engine = ExtractionEngine::builder(config, DynamoFetcher::new(transport))
        .sink(target)
        .cancel_flag(cancel)
        .build()
        .context("Failed to set up extraction")?;

    let summary = engine
        .run()
        .with_context(|| format!("Export of table '{}' failed", cli.table))?;

    info!(
        pages = summary.pages_fetched,
        rows = summary.rows_delivered,
        columns = summary.columns.len(),
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "export finished"
    );
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ExportConfig> {
    let mut config = ExportConfig::new(cli.table.clone())
        .with_page_limit(cli.limit)
        .with_format(cli.format.into())
        .with_delimiter(cli.delimiter as u8);

    if let Some(index) = &cli.index {
        config = config.with_index(index.clone());
    }

    let values: Map<String, Value> = match &cli.values {
        Some(raw) => serde_json::from_str(raw).context("--values must be a JSON object")?,
        None => Map::new(),
    };
    let names: BTreeMap<String, String> = match &cli.names {
        Some(raw) => serde_json::from_str(raw).context("--names must be a JSON object of strings")?,
        None => BTreeMap::new(),
    };

    // Placeholders ride on whichever expression is present
    let attach = |expression: &str| Expression {
        expression: expression.to_string(),
        names: names.clone(),
        values: values.clone(),
    };

    match (&cli.key_condition, &cli.filter) {
        (Some(cond), filter) => {
            config = config.with_key_condition(attach(cond));
            if let Some(filter) = filter {
                config = config.with_filter(Expression::new(filter.clone()));
            }
        }
        (None, Some(filter)) => config = config.with_filter(attach(filter)),
        (None, None) => {
            if !values.is_empty() || !names.is_empty() {
                bail!("--values/--names need --key-condition or --filter");
            }
        }
    }

    Ok(config)
}

fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("dynaexport=debug,warn")
    } else {
        EnvFilter::new("dynaexport=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
