//! Ingest command implementation
//!
//! Reads a track file, runs it through the ingestion orchestrator against the
//! snapshot store and reports the batch outcome.

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::HumanDuration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::shared::{
    CommandOutcome, create_progress_bar, load_configuration, open_store, print_json, save_store,
};
use crate::app::services::ingestion::{
    BatchStatus, IngestionOrchestrator, IngestionPreview, IngestionReport,
};
use crate::cli::args::{GlobalArgs, IngestArgs, OutputFormat};

/// Ingest command runner
///
/// 1. Load configuration and apply command overrides
/// 2. Read the upload and open the store
/// 3. Ingest with a progress bar, honouring cancellation
/// 4. Save whatever was written and print the report
pub async fn run_ingest(
    global: &GlobalArgs,
    args: &IngestArgs,
    cancel: CancellationToken,
) -> Result<CommandOutcome> {
    let mut config = load_configuration(global)?;
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }
    if let Some(template) = &args.name_template {
        config = config.with_name_template(template.clone());
    }
    config.validate().context("Invalid ingestion settings")?;

    let upload = tokio::fs::read(&args.file)
        .await
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    debug!("Read {} bytes from {}", upload.len(), args.file.display());

    let store = open_store(&config).await?;
    let orchestrator = IngestionOrchestrator::new(store.clone(), &config.ingestion)?;

    if args.dry_run {
        let preview = orchestrator
            .preview(&upload)
            .with_context(|| format!("Failed to parse {}", args.file.display()))?;
        print_preview(&preview, global.output_format)?;
        return Ok(CommandOutcome::Success);
    }

    info!("Ingesting {}", args.file.display());
    let progress = global
        .show_progress()
        .then(|| create_progress_bar(0, "rows"));

    let report = orchestrator
        .ingest(&upload, &cancel, progress.as_ref())
        .await
        .with_context(|| format!("Failed to ingest {}", args.file.display()))?;

    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    // Writes are not rolled back, so partial and cancelled batches are kept
    save_store(&store, &config).await?;

    match global.output_format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Human => {
            if !global.quiet {
                print_report(&report);
            }
        }
    }

    if report.is_success() {
        Ok(CommandOutcome::Success)
    } else {
        warn!("Ingestion finished with status {:?}", report.status());
        Ok(CommandOutcome::Incomplete)
    }
}

fn print_report(report: &IngestionReport) {
    let headline = match report.status() {
        BatchStatus::Success => "Ingestion complete".green().bold(),
        BatchStatus::PartialFailure => "Ingestion finished with failures".yellow().bold(),
        BatchStatus::Cancelled => "Ingestion cancelled".red().bold(),
    };

    println!("{}", headline);
    println!(
        "  Rows:       {} processed of {} ({} skipped)",
        report.rows_processed, report.rows_total, report.rows_skipped
    );
    println!(
        "  PMCs:       {} created, {} reused",
        report.pmcs_created, report.pmcs_reused
    );
    println!("  Parameters: {} created", report.params_created);
    println!(
        "  Duration:   {} ({:.0} rows/s)",
        HumanDuration(report.processing_time),
        report.rows_per_second()
    );

    if !report.failures.is_empty() {
        println!();
        println!("{} ({})", "Failures".red().bold(), report.failures.len());
        for failure in &report.failures {
            println!(
                "  row {} (line {}) {}: {}",
                failure.row.to_string().bright_yellow(),
                failure.line,
                failure.field.bright_cyan(),
                failure.error
            );
        }
    }
}

fn print_preview(preview: &IngestionPreview, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(preview);
    }

    println!("{}", "Dry run: nothing written".bright_white().bold());
    println!("  Rows:       {}", preview.rows);
    println!("  PMCs:       {}", preview.pmc_names.len());
    println!("  Parameters: {}", preview.expected_params());
    if preview.rows_without_formation > 0 {
        println!(
            "  {} rows have no formation time and would fail",
            preview.rows_without_formation.to_string().yellow()
        );
    }
    for name in &preview.pmc_names {
        println!("    {}", name.bright_cyan());
    }
    Ok(())
}
