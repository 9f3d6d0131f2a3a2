//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use jutsudex_core::{IngestReporter, IngestStats, LibraryReport, SkipReason, ingest_file};
use jutsudex_render::{RenderOptions, export_store};
use jutsudex_shared::{AppConfig, Rank, expand_home, init_config, load_config};
use jutsudex_store::IngestionStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Jutsudex — normalize a jutsu compendium export.
#[derive(Parser)]
#[command(
    name = "jutsudex",
    version,
    about = "Normalize a line-delimited jutsu compendium export into a de-duplicated library.",
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
    /// Ingest an export file and print library statistics.
    Stats {
        /// Path to the line-delimited export (e.g. jutsu.db).
        file: PathBuf,
    },

    /// Ingest an export file and write the rendered Markdown tree.
    Export {
        /// Path to the line-delimited export (e.g. jutsu.db).
        file: PathBuf,

        /// Output directory (defaults to the configured output_dir).
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Ingest an export file and list records matching a keyword.
    Keywords {
        /// Path to the line-delimited export (e.g. jutsu.db).
        file: PathBuf,

        /// Keyword substring to match, case-insensitively.
        #[arg(short, long)]
        filter: String,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
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
        0 => "jutsudex=info",
        1 => "jutsudex=debug",
        _ => "jutsudex=trace",
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
pub(crate) fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Stats { file } => cmd_stats(&file),
        Command::Export { file, out } => cmd_export(&file, out),
        Command::Keywords { file, filter } => cmd_keywords(&file, &filter),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

/// Ingest an export file with spinner progress, returning the store.
fn ingest_with_progress(file: &Path) -> Result<(IngestionStore, IngestStats)> {
    if !file.is_file() {
        return Err(eyre!("export file '{}' not found", file.display()));
    }

    info!(file = %file.display(), "ingesting export");

    let reporter = CliProgress::new();
    let mut store = IngestionStore::new();
    let stats = ingest_file(file, &mut store, &reporter)?;
    Ok((store, stats))
}

fn cmd_stats(file: &Path) -> Result<()> {
    let (store, stats) = ingest_with_progress(file)?;
    let report = LibraryReport::from_store(&store);

    println!();
    print!("{report}");
    print_skip_summary(&stats);
    Ok(())
}

fn cmd_export(file: &Path, out: Option<PathBuf>) -> Result<()> {
    let config = load_config()?;
    let out_dir = match out {
        Some(dir) => dir,
        None => expand_home(&config.defaults.output_dir),
    };

    let (store, stats) = ingest_with_progress(file)?;

    let opts = RenderOptions {
        exported_at: Some(Utc::now()),
    };
    let result = export_store(&store, &out_dir, &opts)?;

    println!();
    println!("  Library exported!");
    println!("  Records:  {}", store.len());
    println!("  Files:    {}", result.files_written);
    println!("  Replaced: {}", stats.replaced);
    println!("  Skipped:  {}", skipped_total(&stats));
    println!("  Path:     {}", result.out_dir.display());
    println!();
    Ok(())
}

fn cmd_keywords(file: &Path, filter: &str) -> Result<()> {
    let (store, _stats) = ingest_with_progress(file)?;
    let matches = store.filter_by_keyword_substring(filter);

    println!();
    println!("  {} record(s) matching '{filter}':", matches.len());
    for record in matches {
        println!(
            "  [{}] {} ({})",
            record.rank,
            record.name,
            record.keywords.join(", ")
        );
    }
    println!();
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

fn skipped_total(stats: &IngestStats) -> usize {
    stats.skipped_invalid_rank + stats.skipped_missing_field + stats.skipped_malformed
}

fn print_skip_summary(stats: &IngestStats) {
    let skipped = skipped_total(stats);
    if skipped > 0 {
        println!();
        println!(
            "Skipped {skipped} line(s): {} without a usable rank, {} missing fields, {} malformed",
            stats.skipped_invalid_rank, stats.skipped_missing_field, stats.skipped_malformed
        );
    }
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// Ingest reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .expect("valid spinner template")
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl IngestReporter for CliProgress {
    fn record_admitted(&self, name: &str, rank: Rank) {
        self.spinner.set_message(format!("[{rank}] {name}"));
    }

    fn record_replaced(&self, name: &str, old_rank: Rank, new_rank: Rank) {
        self.spinner
            .set_message(format!("{name}: {old_rank} replaced by {new_rank}"));
    }

    fn record_discarded(&self, _name: &str, _kept_rank: Rank, _incoming_rank: Rank) {}

    fn record_skipped(&self, line_no: usize, reason: &SkipReason) {
        self.spinner.set_message(format!("line {line_no}: {reason}"));
    }

    fn done(&self, _stats: &IngestStats) {
        self.spinner.finish_and_clear();
    }
}
