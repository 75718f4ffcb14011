//! AHPKit - Analytic Hierarchy Process toolkit
//!
//! A CLI tool that derives priority weights from expert pairwise
//! comparison matrices, checks their consistency, and aggregates several
//! experts into one group judgment.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, no valid or no consistent matrices)
//!   2 - Group CR at or above the threshold with --strict

mod ahp;
mod cli;
mod commands;
mod config;
mod error;
mod models;
mod report;
mod workbook;

use anyhow::Result;
use cli::{Args, Command};
use commands::Console;
use config::Config;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let console = Console::new(args.quiet);

    // Handle init-config early (no logging needed)
    if let Command::InitConfig = args.command {
        exit_with(commands::init_config(console));
    }

    // Load configuration
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&args, &config);

    info!("AHPKit v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    let result = match &args.command {
        Command::Weights(weights) => commands::weights::run(weights, config, console),
        Command::Rank(rank) => commands::rank::run(rank, config, console),
        Command::Template(template) => commands::template::run(template, console),
        Command::InitConfig => commands::init_config(console),
    };

    exit_with(result);
}

/// Exit with the handler's code, reporting errors once.
fn exit_with(result: Result<i32>) -> ! {
    match result {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };

    // RUST_LOG wins over the flags when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok(config),
        Ok(None) => Ok(Config::default()),
        Err(e) => {
            warn!("Failed to load config: {}", e);
            eprintln!("⚠️  Ignoring unreadable {}: {:#}", config::CONFIG_FILE, e);
            Ok(Config::default())
        }
    }
}
