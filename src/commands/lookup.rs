use anyhow::{Context, Result};
use gutenberg_graph::{
    archive::{rdf_key, ArchiveError, ArchiveSource},
    config::Config,
    store::{GraphStore, StoreClient},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

pub fn lookup_item(
    config: Config,
    id: u64,
    archive: Option<PathBuf>,
    send: bool,
) -> Result<ExitCode> {
    let path = archive.unwrap_or_else(|| config.load.archive_path.clone());
    info!("Looking up {} in {}", rdf_key(id), path.display());

    let mut source = ArchiveSource::open(&path)?.with_suffix(config.load.inner_suffix.clone());
    let hit = match source.inner_archive() {
        Ok(inner) => inner.lookup(id)?,
        Err(ArchiveError::NoInnerArchive { .. }) => None,
        Err(e) => return Err(e).context("Failed to open inner archive"),
    };

    let Some(hit) = hit else {
        println!("Item not found.");
        return Ok(ExitCode::SUCCESS);
    };

    info!(
        "Found {} ({} bytes) after {} entries",
        hit.entry.key, hit.entry.size, hit.entries_scanned
    );
    println!("{}", hit.content);

    if !send {
        return Ok(ExitCode::SUCCESS);
    }

    let mode = config.store.write_mode;
    let store = StoreClient::new(config.store).context("Failed to create graph store client")?;
    let outcome = store.send(&hit.content, mode);
    info!("Key: {}, Size: {}, Response: {}", hit.entry.key, hit.entry.size, outcome);

    if outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Graph store write failed: {}", outcome);
        Ok(ExitCode::FAILURE)
    }
}
