use anyhow::{Context, Result};
use gutenberg_graph::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::Path;

pub fn init_config(path: &Path) -> Result<()> {
    let config = Config::default();
    let config_path = path.join(DEFAULT_CONFIG_FILE);

    if config_path.exists() {
        anyhow::bail!(
            "Configuration file already exists: {}",
            config_path.display()
        );
    }

    let toml_content = format!(
        r#"# Gutenberg Graph Configuration

[store]
# Graph Store Protocol endpoint for the target named graph
data_url = "{}"
update_url = "{}"
query_url = "{}"
username = "{}"
# Prefer the FUSEKI_PASSWORD environment variable
password = ""
timeout_secs = {}
# "replace" (PUT, idempotent) or "append" (POST, duplicates on re-run)
write_mode = "{}"
log_response_body = {}

[load]
archive_path = "{}"
inner_suffix = "{}"
# Uncomment to stop after a fixed number of documents
# max_documents = 10
quiet = false

[trigger]
marker_path = "{}"
# "two-phase": first run only creates the marker; "always": load every run
policy = "two-phase"

[logging]
format = "text"
level = "{}"
"#,
        config.store.data_url,
        config.store.update_url,
        config.store.query_url,
        config.store.username,
        config.store.timeout_secs,
        config.store.write_mode,
        config.store.log_response_body,
        config.load.archive_path.display(),
        config.load.inner_suffix,
        config.trigger.marker_path.display(),
        config.logging.level,
    );

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    std::fs::write(&config_path, toml_content)?;
    println!("Created configuration file: {}", config_path.display());

    Ok(())
}
