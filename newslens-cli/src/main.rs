//! NewsLens CLI: terminal dashboard for the NewsLens analysis backend.
//!
//! Provides one-shot subcommands and an interactive REPL.

mod commands;
mod render;
mod repl;
mod slash;

use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// NewsLens: sentiment, authenticity and related coverage for news articles
#[derive(Parser, Debug)]
#[command(name = "newslens", version, about, long_about = None)]
struct Cli {
    /// Workspace directory
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Analysis backend base URL (overrides configuration)
    #[arg(short, long)]
    backend_url: Option<String>,

    /// Disable ANSI colours
    #[arg(long)]
    no_color: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    /// Subcommand (starts the interactive REPL if omitted)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Where the text for a request comes from.
#[derive(clap::Args, Debug, Clone, Default)]
pub(crate) struct InputArgs {
    /// Article text (read from stdin if neither TEXT nor --file is given)
    text: Option<String>,

    /// Read the article text from a file
    #[arg(short, long, conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Print machine-readable JSON instead of formatted output
    #[arg(long)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Analyze an article's sentiment, authenticity and topics
    Analyze {
        #[command(flatten)]
        input: InputArgs,

        /// Analyze the article at this URL instead of text
        #[arg(long, conflicts_with_all = ["text", "file"])]
        url: Option<String>,
    },
    /// Summarize an article
    Summarize {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Look up articles similar to the given text
    Similar {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Check whether the analysis backend is reachable
    Health {
        /// Keep polling and print every status change
        #[arg(long)]
        watch: bool,

        /// Poll interval in seconds (defaults to backend.health_poll_secs)
        #[arg(long, requires = "watch")]
        interval: Option<u64>,
    },
    /// Show the ML-operations monitoring view (static demo data)
    Mlops {
        #[command(subcommand)]
        view: MlopsView,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug, Clone, PartialEq, Eq)]
pub(crate) enum MlopsView {
    /// Headline counters
    Overview,
    /// List the monitored models
    Models,
    /// Health indicators and metrics of one model
    Health {
        /// Model name or unambiguous prefix (defaults to the first model)
        model: Option<String>,
    },
    /// Alerts, optionally filtered by status
    Alerts {
        /// all, active, resolved or investigating
        #[arg(default_value = "all")]
        filter: String,
    },
    /// Data and model drift over the last day
    Drift,
    /// The ML pipeline graph
    Pipeline,
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Create a default configuration file
    Init,
    /// Show current configuration
    Show,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Set up tracing: human-readable stderr + JSON file logging
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::new(filter));

    let log_dir = directories::ProjectDirs::from("dev", "newslens", "newslens")
        .map(|d| d.data_dir().join("logs"))
        .unwrap_or_else(|| PathBuf::from("."));
    let _ = std::fs::create_dir_all(&log_dir);
    let file_appender = tracing_appender::rolling::daily(&log_dir, "newslens.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let json_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_writer(non_blocking)
        .with_filter(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    // Resolve workspace
    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    // Load configuration
    let mut config = newslens_core::config::load_config(Some(&workspace), None)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    // Apply CLI overrides
    if let Some(url) = &cli.backend_url {
        config.backend.base_url = url.trim_end_matches('/').to_string();
    }
    if cli.no_color {
        config.ui.color = false;
    }
    for warning in config.validate() {
        tracing::warn!("{}", warning);
    }

    match cli.command {
        Some(command) => commands::handle_command(command, &workspace, &config).await,
        None => repl::run_interactive(config, workspace).await,
    }
}
