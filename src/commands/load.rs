use anyhow::{Context, Result};
use gutenberg_graph::{
    config::{Config, TriggerPolicy, WriteMode},
    load::{LoadCoordinator, LoadOptions, LoadOutcome, OneShotTrigger},
    store::StoreClient,
    util::format_bytes,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

pub fn run_load(
    config: Config,
    archive: Option<PathBuf>,
    max_docs: Option<usize>,
    mode: Option<WriteMode>,
    always: bool,
    quiet: bool,
) -> Result<ExitCode> {
    if max_docs == Some(0) {
        anyhow::bail!("--max-docs must be greater than 0");
    }

    let path = archive.unwrap_or_else(|| config.load.archive_path.clone());

    let mut options = LoadOptions::from(&config);
    if let Some(mode) = mode {
        options.write_mode = mode;
    }
    if max_docs.is_some() {
        options.max_documents = max_docs;
    }
    options.quiet |= quiet;

    let store = StoreClient::new(config.store.clone()).context("Failed to create graph store client")?;
    let mut coordinator = LoadCoordinator::new(store, options);

    let report = if always || config.trigger.policy == TriggerPolicy::Always {
        coordinator.run(&path)
    } else {
        let trigger = OneShotTrigger::new(&config.trigger.marker_path);
        match coordinator.run_with_trigger(&trigger, &path)? {
            LoadOutcome::Deferred { marker } => {
                println!(
                    "Created trigger marker {}; run again to load.",
                    marker.display()
                );
                return Ok(ExitCode::SUCCESS);
            }
            LoadOutcome::Finished(report) => report,
        }
    };

    let stats = &report.stats;
    println!("\nLoad {}:", report.state);
    println!("  Documents processed: {}", stats.documents_processed);
    println!("  Stored: {}", stats.documents_sent);
    println!("  Failed: {}", stats.documents_failed);
    println!("  Undecodable: {}", stats.documents_undecodable);
    println!("  Total size: {}", format_bytes(stats.total_bytes));
    println!("  Elapsed: {:.1}s", stats.elapsed_seconds);
    if let Some(ref message) = report.message {
        println!("  Note: {}", message);
    }
    println!("{}", stats.summary_line());

    if report.is_failure() {
        return Ok(ExitCode::FAILURE);
    }

    info!("Load complete");
    Ok(ExitCode::SUCCESS)
}
