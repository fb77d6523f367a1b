//! Shared components for CLI commands
//!
//! Logging setup, configuration loading, snapshot store handling and output
//! helpers used by more than one command.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::MemoryStore;
use crate::app::models::{Param, Pmc};
use crate::app::services::filter::FilterRequest;
use crate::cli::args::{FilterArgs, GlobalArgs};
use crate::config::Config;
use crate::constants::PROGRESS_TEMPLATE;

/// How a command finished; decides the process exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Everything requested was done
    Success,
    /// The command ran but some of its work failed or was cancelled
    Incomplete,
}

impl CommandOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandOutcome::Success => 0,
            CommandOutcome::Incomplete => 1,
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(global: &GlobalArgs) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = global.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pmc_ingest={}", log_level)));

    if global.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

/// Load configuration from file or defaults, then apply global overrides
pub fn load_configuration(global: &GlobalArgs) -> Result<Config> {
    match &global.config_file {
        Some(path) => info!("Using config file: {}", path.display()),
        None => info!("No config file given, using defaults"),
    }

    let mut config = Config::load_or_default(global.config_file.as_deref())
        .context("Failed to load configuration")?;

    if let Some(store) = &global.store {
        config = config.with_snapshot_path(store.clone());
    }

    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Open the snapshot store named by the configuration
pub async fn open_store(config: &Config) -> Result<Arc<MemoryStore>> {
    let path = config.snapshot_path();
    let store = MemoryStore::open(&path)
        .await
        .with_context(|| format!("Failed to open store {}", path.display()))?;
    Ok(Arc::new(store))
}

/// Persist the store after writes
pub async fn save_store(store: &MemoryStore, config: &Config) -> Result<()> {
    let path = config.snapshot_path();
    store
        .save(&path)
        .await
        .with_context(|| format!("Failed to save store {}", path.display()))?;
    info!("Store saved to {}", path.display());
    Ok(())
}

/// Combine a filters file with filters given on the command line
pub async fn load_filter_request(args: &FilterArgs) -> Result<FilterRequest> {
    let mut request = match &args.filters_file {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read filters file {}", path.display()))?;
            serde_json::from_str::<FilterRequest>(&content)
                .with_context(|| format!("Failed to parse filters file {}", path.display()))?
        }
        None => FilterRequest::default(),
    };

    request.filters.extend(args.filters.iter().cloned());
    debug!("Using {} filters", request.filters.len());
    Ok(request)
}

/// Create a progress bar with appropriate styling
pub fn create_progress_bar(total: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    pb.set_style(style);
    pb.set_message(message.to_string());
    pb
}

/// Print any serializable value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// One-line human rendering of a PMC
pub fn format_pmc(pmc: &Pmc) -> String {
    let tracks = if pmc.has_tracks {
        "tracks".green()
    } else {
        "no tracks".bright_black()
    };
    format!(
        "{:>6}  {}  ({}, created {})",
        pmc.id.as_str().bright_yellow(),
        pmc.name.bright_cyan(),
        tracks,
        pmc.created_at.format("%Y-%m-%d %H:%M:%S")
    )
}

/// One-line human rendering of a parameter
pub fn format_param(param: &Param) -> String {
    format!(
        "{:>6}  {} {}: {}",
        param.id.as_str().bright_yellow(),
        param.name.bright_cyan(),
        format!("[{}]", param.kind).bright_black(),
        param.value
    )
}
