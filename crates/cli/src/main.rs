// promolens CLI - discount and promotion analytics over exported sales data

mod exit_codes;
mod logging;
mod options;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use exit_codes::{analytics_exit_code, EXIT_INVALID_CONFIG, EXIT_SUCCESS, EXIT_USAGE};
use promolens_analytics::breakdown::Dimension;
use promolens_analytics::{AnalyticsError, ViewConfig};

#[derive(Parser)]
#[command(name = "promolens")]
#[command(about = "Discount and promotion analytics over sales transactions")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Log pipeline diagnostics to stderr (overridden by PROMOLENS_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute hero metrics, metric cards and breakdowns
    #[command(after_help = "\
Examples:
  promolens metrics sales.csv
  promolens metrics sales.json --config q1.view.toml --json
  promolens metrics sales.csv --location 'Supreme HQ Bandra' --output snapshot.json
  promolens metrics sales.csv --config q1.view.toml --fail-on-empty")]
    Metrics {
        /// Transaction data (.csv or .json)
        data: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Output JSON to stdout instead of human summary
        #[arg(long)]
        json: bool,

        /// Write JSON output to file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Exit with code 5 when no transactions survive the filters
        #[arg(long)]
        fail_on_empty: bool,
    },

    /// Summarize one group (or the whole filtered view) as a drill-down
    #[command(after_help = "\
Examples:
  promolens drill sales.csv
  promolens drill sales.csv --by product --value 'Studio 12 Class Package'
  promolens drill sales.csv --by sold_by --value Online/System --config q1.view.toml")]
    Drill {
        /// Transaction data (.csv or .json)
        data: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Dimension to group by (location, category, product, sold_by, payment_method, month, year)
        #[arg(long, value_parser = parse_dimension, requires = "value")]
        by: Option<Dimension>,

        /// Group key to drill into
        #[arg(long, requires = "by")]
        value: Option<String>,

        /// Omit the raw transactions from the output
        #[arg(long)]
        no_records: bool,
    },

    /// List selectable filter values found in the data
    #[command(after_help = "\
Examples:
  promolens options sales.csv
  promolens options sales.json --json")]
    Options {
        /// Transaction data (.csv or .json)
        data: PathBuf,

        /// Output JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate a view config without running it
    #[command(after_help = "\
Examples:
  promolens validate q1.view.toml")]
    Validate {
        /// Path to the .view.toml config file
        config: PathBuf,
    },
}

/// View selection shared by `metrics` and `drill`.
#[derive(clap::Args, Clone, Default)]
pub struct ViewArgs {
    /// View config (.toml) with location, filters and output options
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Global location selector; overrides the config ("all" for every location)
    #[arg(long, short = 'l')]
    pub location: Option<String>,
}

fn parse_dimension(s: &str) -> Result<Dimension, String> {
    s.parse()
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        "\nengine:  promolens-analytics ",
        env!("CARGO_PKG_VERSION"),
    )
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version come through here too.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_USAGE)
            } else {
                ExitCode::from(EXIT_SUCCESS)
            };
        }
    };
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Metrics {
            data,
            view,
            json,
            output,
            fail_on_empty,
        } => report::cmd_metrics(data, view, json, output, fail_on_empty),
        Commands::Drill {
            data,
            view,
            by,
            value,
            no_records,
        } => report::cmd_drill(data, view, by.zip(value), no_records),
        Commands::Options { data, json } => options::cmd_options(data, json),
        Commands::Validate { config } => cmd_validate(config),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn new(code: u8, msg: impl Into<String>) -> Self {
        Self { code, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl From<AnalyticsError> for CliError {
    fn from(err: AnalyticsError) -> Self {
        let hint = match &err {
            AnalyticsError::UnknownFormat(_) => Some("export the sheet as .csv or .json".to_string()),
            AnalyticsError::DataParse { format: "csv", .. } => {
                Some("headers must use source column names such as discountAmount; numeric cells must be numbers or blank".to_string())
            }
            _ => None,
        };
        Self { code: analytics_exit_code(&err), message: err.to_string(), hint }
    }
}

// ============================================================================
// Shared loading
// ============================================================================

/// Read and validate a view config.
pub fn load_view_config(path: &Path) -> Result<ViewConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        CliError::new(EXIT_INVALID_CONFIG, format!("cannot read config {}: {e}", path.display()))
    })?;
    let config = ViewConfig::from_toml(&text)?;
    tracing::debug!("loaded view '{}' from {}", config.name, path.display());
    Ok(config)
}

/// The view to run: config file (or defaults) with the CLI location applied.
pub fn resolve_view(args: &ViewArgs) -> Result<ViewConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => load_view_config(path)?,
        None => ViewConfig::default(),
    };
    if let Some(location) = &args.location {
        config.location = location.clone();
    }
    Ok(config)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_view_config(&config_path)?;
    eprintln!(
        "valid: view '{}' (location: {}, {} breakdown(s), top {}{})",
        config.name,
        config.location,
        config.breakdowns.len(),
        config.top_n,
        if config.filters.is_empty() { ", no filters" } else { "" },
    );
    Ok(())
}
