//! Create, show and add-param command implementations

use anyhow::{Context, Result};
use colored::Colorize;

use super::shared::{
    CommandOutcome, format_param, format_pmc, load_configuration, open_store, print_json,
    save_store,
};
use crate::app::models::{EntityId, NewParam};
use crate::app::services::catalog::CatalogService;
use crate::cli::args::{AddParamArgs, CreateArgs, GlobalArgs, OutputFormat, ShowArgs};

/// Create a PMC, reusing an existing one with the same name
pub async fn run_create(global: &GlobalArgs, args: &CreateArgs) -> Result<CommandOutcome> {
    let config = load_configuration(global)?;
    let store = open_store(&config).await?;
    let catalog = CatalogService::new(store.clone());

    let pmc = catalog
        .create_pmc(&args.name)
        .await
        .with_context(|| format!("Failed to create PMC '{}'", args.name))?;
    save_store(&store, &config).await?;

    match global.output_format {
        OutputFormat::Json => print_json(&pmc)?,
        OutputFormat::Human => println!("{}", format_pmc(&pmc)),
    }
    Ok(CommandOutcome::Success)
}

/// Show one PMC with its parameters
pub async fn run_show(global: &GlobalArgs, args: &ShowArgs) -> Result<CommandOutcome> {
    let config = load_configuration(global)?;
    let store = open_store(&config).await?;
    let catalog = CatalogService::new(store);

    let pmc = catalog
        .get_pmc(&EntityId::new(args.id.as_str()))
        .await
        .with_context(|| format!("Failed to load PMC {}", args.id))?;

    match global.output_format {
        OutputFormat::Json => print_json(&pmc)?,
        OutputFormat::Human => println!("{}", format_pmc(&pmc)),
    }
    Ok(CommandOutcome::Success)
}

/// Attach a single parameter to an existing PMC
pub async fn run_add_param(global: &GlobalArgs, args: &AddParamArgs) -> Result<CommandOutcome> {
    let config = load_configuration(global)?;
    let store = open_store(&config).await?;
    let catalog = CatalogService::new(store.clone());

    let param = NewParam::new(args.name.as_str(), args.kind, args.value.as_str());
    let created = catalog
        .create_param(&EntityId::new(args.pmc_id.as_str()), &param)
        .await
        .with_context(|| format!("Failed to add '{}' to PMC {}", args.name, args.pmc_id))?;
    save_store(&store, &config).await?;

    match global.output_format {
        OutputFormat::Json => print_json(&created)?,
        OutputFormat::Human => {
            println!("{} {}", "Added".green(), format_param(&created));
        }
    }
    Ok(CommandOutcome::Success)
}
