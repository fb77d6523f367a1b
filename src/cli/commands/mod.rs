//! Command implementations for the PMC CLI
//!
//! Each command lives in its own module and returns a [`CommandOutcome`]
//! that `main` turns into the process exit code.

pub mod catalog;
pub mod ingest;
pub mod listing;
pub mod shared;

pub use shared::CommandOutcome;

use anyhow::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cli::args::{Args, Commands};

/// Main command runner
///
/// Sets up logging, validates the arguments and dispatches to:
/// - `ingest`: CSV ingestion with per-item failure reporting
/// - `list` / `params`: filtered listings
/// - `create` / `show` / `add-param`: single-entity operations
pub async fn run(args: Args, cancel: CancellationToken) -> Result<CommandOutcome> {
    shared::setup_logging(&args.global);
    debug!("Command line arguments: {:?}", args);

    args.validate()?;

    let global = &args.global;
    match args.get_command()? {
        Commands::Ingest(ingest_args) => ingest::run_ingest(global, ingest_args, cancel).await,
        Commands::List(list_args) => listing::run_list(global, list_args).await,
        Commands::Params(params_args) => listing::run_params(global, params_args).await,
        Commands::Create(create_args) => catalog::run_create(global, create_args).await,
        Commands::Show(show_args) => catalog::run_show(global, show_args).await,
        Commands::AddParam(add_args) => catalog::run_add_param(global, add_args).await,
    }
}
