mod cli;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use scrape_engine::{run_scrape, Collaborators, RunError, RunSummary};
use scrape_logging::{init_json_logger, scrape_error, scrape_info};

use crate::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = init_json_logger(cli.log_level.into()).context("installing the logger") {
        eprintln!("scrape_docs: {err:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(summary) => {
            report(&summary);
            ExitCode::SUCCESS
        }
        Err(err) => {
            // run_scrape already logged its own fatal event with the error code.
            if err.downcast_ref::<RunError>().is_none() {
                scrape_error!("scrape_docs failed: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let config = cli.scrape_config();
    let collaborators =
        Collaborators::from_settings(&config.fetch).context("building the HTTP client")?;
    let summary = run_scrape(&config, collaborators)?;
    Ok(summary)
}

fn report(summary: &RunSummary) {
    let checklist = summary.checklist_path.display().to_string();
    scrape_info!(
        filepath = checklist.as_str();
        "Run complete for {}: {} URLs processed ({} succeeded, {} failed), {} files written to {}",
        summary.base_name,
        summary.pool.processed,
        summary.pool.succeeded,
        summary.pool.failed,
        summary.writer.written,
        summary.docs_dir.display()
    );
    if summary.rejected > 0 {
        scrape_info!("{} tree lines were rejected as invalid URLs", summary.rejected);
    }
    if let Some(ledger) = summary.ledger {
        if ledger.pending > 0 {
            scrape_info!(
                filepath = checklist.as_str();
                "{} URLs remain pending in {}", ledger.pending, checklist
            );
        }
    }
}
