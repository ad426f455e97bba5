mod aggregate;
mod collapse;
mod config;
mod error;
mod filters;
mod inputs;
mod measurement;
mod metrics;
mod record;
mod report;

use clap::Parser;
use config::{AnalyzerConfig, Overrides};
use error::AnalyzerError;
use metrics::Metric;
use report::OutputFormat;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Ranks compiler invocations recorded by timem by how expensive they were,
/// labelling each one with only the arguments that set it apart.
#[derive(Parser, Debug)]
#[command(
    name = "compile-time-perf",
    version,
    about,
    after_help = "All arguments after a standalone '--' are treated as input \
                  files/directories, e.g. compile-time-perf <options> -- bar.json baz/"
)]
pub struct Cli {
    /// JSON files from timem, directories containing them, or file prefixes
    #[arg(value_name = "INPUTS")]
    inputs: Vec<PathBuf>,

    /// Print debug messages to stderr
    #[arg(short, long, visible_alias = "debug")]
    verbose: bool,

    /// Max number of entries to display per metric (0 = all)
    #[arg(short = 'n', value_name = "N")]
    max_entries: Option<usize>,

    /// Regexes for command-line arguments to include in labels
    #[arg(short = 'i', value_name = "REGEX", num_args = 1.., allow_hyphen_values = true)]
    include_regex: Option<Vec<String>>,

    /// Regexes for command-line arguments to remove from labels
    #[arg(short = 'e', value_name = "REGEX", num_args = 1.., allow_hyphen_values = true)]
    exclude_regex: Option<Vec<String>>,

    /// File extensions (without period) to include in labels. Keywords
    /// 'lang-c', 'lang-cxx', 'lang-fortran' and 'lang-all' add common
    /// extensions; 'none' disables extension filtering
    #[arg(short = 'f', value_name = "EXT", num_args = 1..)]
    file_extensions: Option<Vec<String>>,

    /// Strings to strip from the start/end of labels
    #[arg(short = 's', value_name = "STR", num_args = 1.., allow_hyphen_values = true)]
    strip: Option<Vec<String>>,

    /// Regexes to strip from the start/end of labels
    #[arg(short = 'r', value_name = "REGEX", num_args = 1.., allow_hyphen_values = true)]
    regex_strip: Option<Vec<String>>,

    /// Metrics to display
    #[arg(short = 'm', value_name = "METRIC", num_args = 1.., value_enum)]
    metrics: Option<Vec<Metric>>,

    /// List the metrics which can be (potentially) reported and exit
    #[arg(short, long)]
    list_metrics: bool,

    /// Config file path (default: compile-time-perf.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            metrics: self.metrics.clone(),
            max_entries: self.max_entries,
            format: self.format,
            include: self.include_regex.clone(),
            exclude: self.exclude_regex.clone(),
            extensions: self.file_extensions.clone(),
            strip: self.strip.clone(),
            regex_strip: self.regex_strip.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    tracing::debug!(?cli, "parsed CLI arguments");

    if cli.list_metrics {
        metrics::handle_list_metrics();
        return ExitCode::SUCCESS;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AnalyzerError> {
    let cwd = std::env::current_dir().unwrap_or_default();
    let mut file_config = AnalyzerConfig::load(cli.config.as_deref(), &cwd)?;
    file_config.apply_overrides(cli.overrides());
    let config = file_config.resolve()?;
    tracing::debug!(?config, "resolved configuration");

    let documents = inputs::load_inputs(&cli.inputs)?;
    let records = record::parse_documents(
        documents
            .iter()
            .map(|doc| (doc.path.as_path(), &doc.json)),
        &config.metrics,
    )?;
    tracing::info!(
        documents = documents.len(),
        records = records.len(),
        "loaded timem output"
    );

    let aggregate = aggregate::aggregate(&records, &config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    report::render(&mut out, &aggregate, config.format)?;
    Ok(())
}
