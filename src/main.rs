use clap::{CommandFactory, Parser};
use pmc_ingest::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

fn main() {
    let args = Args::parse();

    // No subcommand: show help and exit
    if args.command.is_none() {
        let _ = Args::command().print_long_help();
        println!();
        process::exit(0);
    }

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Ctrl+C stops new rows from starting; in-flight writes finish and are reported
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, finishing in-flight work...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(outcome) => process::exit(outcome.exit_code()),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
