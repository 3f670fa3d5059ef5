//! stratify: extract normalized records from documents, URLs, and
//! directory trees

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use clap::{Parser, ValueEnum};
use console::style;
use indicatif::ProgressBar;
use tracing_subscriber::EnvFilter;

use stratify_core::{
    output, EngineConfig, ExtractionPipeline, OutputFormat, ProgressReporter, SourceKind, Strategy,
    UnstructuredClient,
};

#[derive(Parser)]
#[command(
    name = "stratify",
    version,
    about = "Extract structured records from documents, URLs, and directory trees"
)]
struct Cli {
    /// Document path, directory, or URL to process
    source: String,

    /// Output file path (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Partition strategy (defaults to hi_res)
    #[arg(short, long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Optimize for label/value-dense layouts; forces hi_res unless a
    /// strategy was given
    #[arg(short, long)]
    form_mode: bool,

    /// Output rendering format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// TOML configuration file for the partition endpoint
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum StrategyArg {
    Fast,
    HiRes,
    OcrOnly,
    Auto,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Fast => Strategy::Fast,
            StrategyArg::HiRes => Strategy::HiRes,
            StrategyArg::OcrOnly => Strategy::OcrOnly,
            StrategyArg::Auto => Strategy::Auto,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
#[value(rename_all = "snake_case")]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Styled console reporting with a progress bar for directory runs
struct ConsoleReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleReporter {
    fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }
}

impl ProgressReporter for ConsoleReporter {
    fn source_resolved(&self, kind: SourceKind, total: usize) {
        match kind {
            SourceKind::Url => {
                eprintln!("{} downloaded remote document", style("fetched").blue().bold());
            }
            SourceKind::File => {}
            SourceKind::Directory => {
                eprintln!(
                    "{} {} supported files",
                    style("found").blue().bold(),
                    total
                );
                *self.bar.lock().unwrap() = Some(ProgressBar::new(total as u64));
            }
        }
    }

    fn file_started(&self, path: &Path) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                bar.set_message(name.to_string());
            }
        } else {
            eprintln!(
                "{} {}",
                style("processing").blue().bold(),
                path.display()
            );
        }
    }

    fn file_completed(&self, _path: &Path, _records: usize) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }

    fn file_failed(&self, _path: &Path, _message: &str) {
        if let Some(bar) = self.bar.lock().unwrap().as_ref() {
            bar.inc(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let strategy = match (cli.strategy, cli.form_mode) {
        (Some(arg), _) => arg.into(),
        (None, true) => {
            tracing::debug!("form mode: selecting hi_res");
            Strategy::HiRes
        }
        (None, false) => Strategy::default(),
    };

    let config = EngineConfig::load(cli.config.as_deref())?;
    let engine = UnstructuredClient::new(config)?;
    let pipeline = ExtractionPipeline::new(engine, strategy)
        .with_reporter(Box::new(ConsoleReporter::new()));

    let result = pipeline.run(&cli.source).await?;

    for failure in &result.failures {
        eprintln!(
            "{} {}: {}",
            style("failed").red().bold(),
            failure.path.display(),
            failure.message
        );
    }

    output::write(&result.records, cli.format.into(), cli.output.as_deref())?;

    if let Some(ref path) = cli.output {
        eprintln!(
            "{} {} records written to {}",
            style("done").green().bold(),
            result.records.len(),
            path.display()
        );
    }

    Ok(())
}
