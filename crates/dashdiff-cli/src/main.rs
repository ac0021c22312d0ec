//! dashdiff CLI
//!
//! Command-line interface for dashdiff - document versions, diffs and restores.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use dashdiff_core::{Config, SortDirection, Store, VersionOrder, VersionSelector};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "dashdiff")]
#[command(about = "dashdiff - Version history, diffs and restores for JSON documents")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Save a JSON file as the next version of a document
    Save {
        /// Document ID
        document: i64,
        /// JSON file to save (`-` reads stdin)
        file: PathBuf,
        /// Actor recorded on the new version
        #[arg(long, default_value_t = 0)]
        actor: i64,
        /// Version message
        #[arg(short, long)]
        message: Option<String>,
    },
    /// List versions of a document
    #[command(alias = "ls")]
    Versions {
        /// Document ID
        document: i64,
        /// Maximum number of versions (defaults to the configured page size)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Number of versions to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,
        /// Sort column (version, created)
        #[arg(long, default_value = "version")]
        order: VersionOrder,
        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },
    /// Show one version (or `current` for the live document)
    Show {
        /// Document ID
        document: i64,
        /// Version number or `current`
        #[arg(value_name = "VERSION")]
        selector: VersionSelector,
    },
    /// Compare two versions of a document
    Diff {
        /// Document ID
        document: i64,
        /// Original version number or `current`
        from: VersionSelector,
        /// New version number or `current`
        to: VersionSelector,
        /// Output format (delta, json, basic)
        #[arg(short, long)]
        format: Option<String>,
        /// Label unchanged array elements with their index (basic format)
        #[arg(long)]
        show_array_index: bool,
        /// Wrap added/deleted lines in span markup (basic format)
        #[arg(long)]
        color: bool,
    },
    /// Restore a document to an earlier version
    Restore {
        /// Document ID
        document: i64,
        /// Version to restore
        #[arg(value_name = "VERSION")]
        target: i64,
        /// Actor recorded on the new version
        #[arg(long, default_value_t = 0)]
        actor: i64,
    },
    /// Show document status
    Status {
        /// Document ID
        document: i64,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, diff_format, show_array_index, coloring, page_size, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Config commands work without opening the store
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => {
                commands::config::show(cli.config.as_ref(), &output)
            }
            Some(ConfigCommands::Set { key, value }) => {
                commands::config::set(key, value, cli.config.as_ref(), &output)
            }
        };
    }

    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config, cli.verbose);

    let mut store = Store::open_with_config(config)?;
    debug!("Store opened");

    match cli.command {
        Commands::Save {
            document,
            file,
            actor,
            message,
        } => commands::save::save(&mut store, document, &file, actor, message, &output),
        Commands::Versions {
            document,
            limit,
            offset,
            order,
            asc,
        } => {
            let direction = if asc {
                SortDirection::Ascending
            } else {
                SortDirection::Descending
            };
            commands::version::list(&store, document, limit, offset, order, direction, &output)
        }
        Commands::Show { document, selector } => {
            commands::version::show(&store, document, selector, &output)
        }
        Commands::Diff {
            document,
            from,
            to,
            format,
            show_array_index,
            color,
        } => commands::diff::diff(
            &store,
            document,
            from,
            to,
            format,
            show_array_index,
            color,
            &output,
        ),
        Commands::Restore {
            document,
            target,
            actor,
        } => commands::restore::restore(&mut store, document, target, actor, &output),
        Commands::Status { document } => commands::status::show(&store, document, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Install the tracing subscriber
///
/// Level comes from `RUST_LOG` when set, otherwise from `-v`. Logs go to
/// the configured log file, or stderr.
fn init_logging(config: &Config, verbose: u8) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        EnvFilter::new(format!("dashdiff_core={},dashdiff_cli={}", level, level))
    });

    let Some(log_path) = config.log_file.as_ref() else {
        // Ignore error if already initialized
        let _ = tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
        return;
    };

    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .try_init();
}
