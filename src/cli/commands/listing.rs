//! List and params command implementations

use anyhow::{Context, Result};
use colored::Colorize;

use super::shared::{
    CommandOutcome, format_param, format_pmc, load_configuration, load_filter_request, open_store,
    print_json,
};
use crate::app::models::EntityId;
use crate::app::services::query::QueryService;
use crate::cli::args::{GlobalArgs, ListArgs, OutputFormat, ParamsArgs};

/// Print one page of PMCs matching the given filters
pub async fn run_list(global: &GlobalArgs, args: &ListArgs) -> Result<CommandOutcome> {
    let config = load_configuration(global)?;
    let request = load_filter_request(&args.filter).await?;
    let store = open_store(&config).await?;

    let service = QueryService::new(store, config.query.clone());
    let page_request = service.page_request(args.page, args.page_size);
    let page = service
        .list_pmcs(&request, page_request)
        .await
        .context("Failed to list PMCs")?;

    match global.output_format {
        OutputFormat::Json => print_json(&page)?,
        OutputFormat::Human => {
            if page.list.is_empty() {
                println!("{}", "No PMCs match".bright_black());
            }
            for pmc in &page.list {
                println!("{}", format_pmc(pmc));
            }
            println!(
                "{}",
                format!(
                    "Page {} of {} ({} total){}",
                    page.page,
                    page.page_count().max(1),
                    page.total_count,
                    if page.is_last_page { ", last page" } else { "" }
                )
                .bright_black()
            );
        }
    }

    Ok(CommandOutcome::Success)
}

/// Print the parameters of one PMC
pub async fn run_params(global: &GlobalArgs, args: &ParamsArgs) -> Result<CommandOutcome> {
    let config = load_configuration(global)?;
    let request = load_filter_request(&args.filter).await?;
    let store = open_store(&config).await?;

    let service = QueryService::new(store, config.query.clone());
    let params = service
        .list_params(&EntityId::new(args.pmc_id.as_str()), &request)
        .await
        .with_context(|| format!("Failed to list parameters of PMC {}", args.pmc_id))?;

    match global.output_format {
        OutputFormat::Json => print_json(&params)?,
        OutputFormat::Human => {
            if params.is_empty() {
                println!("{}", "No parameters match".bright_black());
            }
            for param in &params {
                println!("{}", format_param(param));
            }
        }
    }

    Ok(CommandOutcome::Success)
}
