use anyhow::{Context, Result};
use gutenberg_graph::{config::Config, store::StoreClient};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// Read a request body from a file, or stdin for "-"
fn read_input(input: &Path) -> Result<String> {
    if input == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read stdin")?;
        return Ok(text);
    }

    std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))
}

pub fn run_update(config: Config, input: PathBuf) -> Result<ExitCode> {
    let update = read_input(&input)?;
    let store = StoreClient::new(config.store).context("Failed to create graph store client")?;

    let body = store.update(&update).context("SPARQL update failed")?;
    info!("Update accepted");
    if !body.trim().is_empty() {
        println!("{}", body.trim_end());
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_query(config: Config, input: PathBuf) -> Result<ExitCode> {
    let query = read_input(&input)?;
    let store = StoreClient::new(config.store).context("Failed to create graph store client")?;

    let body = store.query(&query).context("SPARQL query failed")?;
    print!("{}", body);
    Ok(ExitCode::SUCCESS)
}
