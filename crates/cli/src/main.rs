//! Gleaner CLI: the operator entry point.
//!
//! Commands:
//! - `fetchers`  List registered fetchers and their capabilities
//! - `fetch`     Run one aggregation and print the resulting mapping
//! - `config`    Show, locate, or validate configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gleaner_config::GleanerConfig;

mod commands;

#[derive(Parser)]
#[command(
    name = "gleaner",
    about = "Gleaner: context aggregation for prompt construction",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to load instead of ~/.gleaner/config.toml
    #[arg(short, long, global = true, env = "GLEANER_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered fetchers
    Fetchers,

    /// Fetch context data and print the aggregated mapping
    Fetch(commands::fetch::FetchArgs),

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Print the config file path
    Path,
    /// Check the configuration for errors
    Validate,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = cli.config.clone().unwrap_or_else(GleanerConfig::config_path);

    // Loaded up front; `config validate` reports a failed load itself
    let loaded = GleanerConfig::load_with_overrides(&config_path);
    let defaults = GleanerConfig::default();
    init_tracing(cli.verbose, loaded.as_ref().unwrap_or(&defaults));

    match cli.command {
        Commands::Config {
            action: ConfigAction::Validate,
        } => commands::config_cmd::validate(&config_path, loaded).await?,
        Commands::Config {
            action: ConfigAction::Path,
        } => commands::config_cmd::path(&config_path).await?,
        command => {
            let config = loaded.map_err(|e| format!("Failed to load config: {e}"))?;
            match command {
                Commands::Fetchers => commands::fetchers::run(&config).await?,
                Commands::Fetch(args) => commands::fetch::run(&config, args).await?,
                // only `config show` is left
                Commands::Config { .. } => commands::config_cmd::show(&config).await?,
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable.
fn init_tracing(verbose: bool, config: &GleanerConfig) {
    let filter = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
