//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use linkdex_core::{ProgressReporter, RunReport};
use linkdex_shared::{
    AppConfig, LinkdexError, Outcome, OutcomeStatus, RunConfig, init_config, load_config,
};
use tracing::info;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// linkdex — ingest bookmark exports into a searchable index.
#[derive(Parser)]
#[command(
    name = "linkdex",
    version,
    about = "Ingest a browser bookmark export into a searchable index.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ingest a bookmark export into the index.
    Ingest(IngestArgs),

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Flags for the `ingest` subcommand. Values fall back to the config file,
/// then to built-in defaults; `--location` and `--database` have no default.
#[derive(Args)]
pub(crate) struct IngestArgs {
    /// Path to the bookmark export file.
    #[arg(short, long)]
    pub location: Option<PathBuf>,

    /// Path to the dedup ledger database (created if absent).
    #[arg(short, long)]
    pub database: Option<PathBuf>,

    /// Index sink host.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Index sink port.
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Index name documents are written under.
    #[arg(short, long)]
    pub index: Option<String>,

    /// Number of parallel pool workers.
    #[arg(short = 'c', long)]
    pub pool_size: Option<usize>,

    /// User-Agent to use while fetching pages.
    #[arg(short, long)]
    pub agent: Option<String>,

    /// Directory the run report is written into (defaults to the working directory).
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Skip the persistent dedup ledger and process every URL.
    #[arg(long)]
    pub no_dedup: bool,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "linkdex=info",
        1 => "linkdex=debug",
        _ => "linkdex=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ingest(args) => cmd_ingest(args).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Run config merge
// ---------------------------------------------------------------------------

/// Merge CLI flags over config-file values over defaults. Missing required
/// parameters abort here, before any processing, naming the flag.
fn merge_run_config(config: &AppConfig, args: &IngestArgs) -> linkdex_shared::Result<RunConfig> {
    let location = args
        .location
        .clone()
        .ok_or_else(|| LinkdexError::config("parameter --location is required"))?;

    let dedup_enabled = !args.no_dedup;
    if dedup_enabled && args.database.is_none() {
        return Err(LinkdexError::config(
            "parameter --database is required (or pass --no-dedup)",
        ));
    }

    Ok(RunConfig {
        location,
        database: args.database.clone(),
        index_host: args
            .server
            .clone()
            .unwrap_or_else(|| config.index.host.clone()),
        index_port: args.port.unwrap_or(config.index.port),
        index_name: args
            .index
            .clone()
            .unwrap_or_else(|| config.index.name.clone()),
        pool_size: args.pool_size.unwrap_or(config.defaults.pool_size),
        user_agent: args
            .agent
            .clone()
            .unwrap_or_else(|| config.defaults.user_agent.clone()),
        fetch_timeout_secs: config.defaults.fetch_timeout_secs,
        dedup_enabled,
        output_dir: args.out_dir.clone().unwrap_or_else(|| PathBuf::from(".")),
    })
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_ingest(args: IngestArgs) -> Result<()> {
    let config = load_config()?;
    let run_config = merge_run_config(&config, &args)?;

    info!(
        location = %run_config.location.display(),
        index = %run_config.index_name,
        pool_size = run_config.pool_size,
        dedup = run_config.dedup_enabled,
        "ingesting bookmark export"
    );

    let reporter = CliProgress::new();
    let report = linkdex_core::run(&run_config, &reporter).await?;

    println!();
    println!("  Ingestion run complete!");
    println!("  Run:     {}", report.run_id);
    println!("  URLs:    {}", report.outcomes.len());
    println!("  Success: {}", report.count(OutcomeStatus::Success));
    println!("  Failed:  {}", report.count(OutcomeStatus::Fail));
    println!("  Skipped: {}", report.count(OutcomeStatus::Skipped));
    if let Some(path) = &report.artifact {
        println!("  Report:  {}", path.display());
    }
    println!("  Time:    {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("created {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config = load_config()?;
    let toml_str = toml::to_string_pretty(&config).map_err(|e| eyre!("serialize config: {e}"))?;
    print!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn url_done(&self, outcome: &Outcome, completed: usize, total: usize) {
        self.spinner.set_message(format!(
            "[{completed}/{total}] {} {}",
            outcome.status, outcome.url
        ));
    }

    fn done(&self, _report: &RunReport) {
        self.spinner.finish_and_clear();
    }
}
