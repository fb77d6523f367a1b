//! Command-line argument definitions for the PMC ingestion tool
//!
//! This module defines the CLI interface using the clap derive API. Global
//! options (configuration file, snapshot store, verbosity and output format)
//! apply to every subcommand.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::app::models::ParamType;
use crate::app::services::filter::Filter;
use crate::constants::MAX_PAGE_SIZE;
use crate::{Error, Result};

/// CLI arguments for the PMC ingestion tool
///
/// Loads cyclone track files into PMC records and queries them with
/// whitelisted filters.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pmc",
    version,
    about = "Ingest PMC track files from CSV and query the stored records",
    long_about = "Loads polar mesocyclone (PMC) track files from CSV into PMC records with typed \
                  parameters. Rows sharing a formation time are attached to a single PMC, writes \
                  are issued concurrently and failures are reported per row and field. Stored \
                  records can be listed with declarative field:condition:value filters."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by all subcommands
#[derive(Debug, Clone, Parser)]
pub struct GlobalArgs {
    /// Path to configuration file
    ///
    /// JSON configuration with `ingestion`, `query` and `storage` sections.
    /// Defaults are used when not specified.
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (JSON format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Snapshot store location, overriding the configured one
    #[arg(
        short = 's',
        long = "store",
        value_name = "FILE",
        global = true,
        help = "Path of the JSON snapshot store"
    )]
    pub store: Option<PathBuf>,

    /// Output format for results
    #[arg(
        long = "output-format",
        value_enum,
        default_value = "human",
        global = true,
        help = "Output format for results"
    )]
    pub output_format: OutputFormat,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Suppress output (quiet mode)
    ///
    /// Only show errors. Overrides verbose settings and hides progress bars.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Suppress all output except errors"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Ingest a PMC track file
    Ingest(IngestArgs),
    /// List PMCs with optional filters
    List(ListArgs),
    /// Create a PMC, or return the existing one with that name
    Create(CreateArgs),
    /// Show a single PMC
    Show(ShowArgs),
    /// List the parameters of a PMC
    Params(ParamsArgs),
    /// Attach a parameter to a PMC
    AddParam(AddParamArgs),
}

/// Arguments for the ingest command
#[derive(Debug, Clone, Parser)]
pub struct IngestArgs {
    /// CSV file with one row per track observation
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Number of rows processed concurrently
    ///
    /// Overrides `ingestion.workers` from the configuration.
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        help = "Number of rows processed concurrently"
    )]
    pub workers: Option<usize>,

    /// Template deriving the PMC name, must contain {formation}
    #[arg(long = "name-template", value_name = "TEMPLATE")]
    pub name_template: Option<String>,

    /// Parse and check the file without writing anything
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Filter options shared by listing commands
#[derive(Debug, Clone, Default, Parser)]
pub struct FilterArgs {
    /// Filter as field:condition:value, repeatable
    #[arg(
        short = 'f',
        long = "filter",
        value_name = "FIELD:CONDITION:VALUE",
        help = "Filter as field:condition:value (conditions: equals, not, contains)"
    )]
    pub filters: Vec<Filter>,

    /// JSON file holding a `{"filters": [...]}` request body
    #[arg(long = "filters-file", value_name = "FILE")]
    pub filters_file: Option<PathBuf>,
}

/// Arguments for the list command
#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Page number, starting at 1
    #[arg(short = 'p', long = "page", value_name = "N")]
    pub page: Option<usize>,

    /// Entities per page
    #[arg(long = "page-size", value_name = "N")]
    pub page_size: Option<usize>,
}

/// Arguments for the create command
#[derive(Debug, Clone, Parser)]
pub struct CreateArgs {
    /// Name of the PMC
    #[arg(value_name = "NAME")]
    pub name: String,
}

/// Arguments for the show command
#[derive(Debug, Clone, Parser)]
pub struct ShowArgs {
    /// PMC identifier
    #[arg(value_name = "ID")]
    pub id: String,
}

/// Arguments for the params command
#[derive(Debug, Clone, Parser)]
pub struct ParamsArgs {
    /// PMC identifier
    #[arg(value_name = "PMC_ID")]
    pub pmc_id: String,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Arguments for the add-param command
#[derive(Debug, Clone, Parser)]
pub struct AddParamArgs {
    /// PMC identifier
    #[arg(value_name = "PMC_ID")]
    pub pmc_id: String,

    /// Parameter name
    #[arg(short = 'n', long = "name")]
    pub name: String,

    /// Parameter type (coords, number, date, string)
    #[arg(short = 't', long = "type", default_value = "string")]
    pub kind: ParamType,

    /// Parameter value
    #[arg(long = "value", default_value = "")]
    pub value: String,
}

/// Output format options for results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the selected command, or an error when none was given
    pub fn get_command(&self) -> Result<&Commands> {
        self.command
            .as_ref()
            .ok_or_else(|| Error::configuration("No command given"))
    }

    /// Validate the arguments for consistency
    pub fn validate(&self) -> Result<()> {
        match &self.command {
            Some(Commands::Ingest(ingest)) => {
                if ingest.workers == Some(0) {
                    return Err(Error::configuration(
                        "Number of workers must be greater than 0",
                    ));
                }
                if !ingest.file.exists() {
                    return Err(Error::configuration(format!(
                        "Input file does not exist: {}",
                        ingest.file.display()
                    )));
                }
            }
            Some(Commands::List(list)) => {
                if list.page == Some(0) {
                    return Err(Error::validation("page", "Page must be at least 1"));
                }
                if let Some(size) = list.page_size {
                    if size == 0 || size > MAX_PAGE_SIZE {
                        return Err(Error::validation(
                            "pageSize",
                            format!("Page size must be between 1 and {}", MAX_PAGE_SIZE),
                        ));
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }
}

impl GlobalArgs {
    /// Get the log level based on verbosity
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode or JSON output)
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.output_format == OutputFormat::Human
    }
}
