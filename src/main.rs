//! gutenberg-graph: load Project Gutenberg RDF metadata into a graph store

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use gutenberg_graph::config::{Config, LogFormat, WriteMode, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gutenberg-graph")]
#[command(about = "Load Project Gutenberg RDF metadata into a SPARQL graph store")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load every RDF record from the feed into the graph store
    Load {
        /// Path to rdf-files.tar.zip (overrides the config)
        archive: Option<PathBuf>,

        /// Stop after this many documents
        #[arg(long)]
        max_docs: Option<usize>,

        /// Replace (PUT) or append (POST)
        #[arg(short, long, value_enum)]
        mode: Option<WriteMode>,

        /// Skip the trigger marker check and load right away
        #[arg(long)]
        always: bool,

        /// Quiet mode (no progress output)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Print the RDF record of a single item
    Lookup {
        /// Gutenberg item number
        id: u64,

        /// Path to rdf-files.tar.zip (overrides the config)
        archive: Option<PathBuf>,

        /// Also write the record to the graph store
        #[arg(long)]
        send: bool,
    },

    /// Submit a SPARQL update ("-" reads stdin)
    Update {
        input: PathBuf,
    },

    /// Run a SPARQL query and print the response ("-" reads stdin)
    Query {
        input: PathBuf,
    },

    /// Show whether the trigger marker is in place
    Status,

    /// Write a default configuration file
    Init {
        /// Output directory
        #[arg(default_value = ".")]
        path: PathBuf,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // No configuration exists yet when initializing one
    if let Commands::Init { path } = &cli.command {
        init_logging(&Config::default(), cli.verbose);
        commands::init::init_config(path)?;
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load_or_default(&cli.config)?;
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Load {
            archive,
            max_docs,
            mode,
            always,
            quiet,
        } => commands::load::run_load(config, archive, max_docs, mode, always, quiet),
        Commands::Lookup { id, archive, send } => {
            commands::lookup::lookup_item(config, id, archive, send)
        }
        Commands::Update { input } => commands::sparql::run_update(config, input),
        Commands::Query { input } => commands::sparql::run_query(config, input),
        Commands::Status => commands::status::show_status(config),
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
    }
}

/// Install the global subscriber; `RUST_LOG` takes precedence over the config
fn init_logging(config: &Config, verbose: u8) {
    let level = config.logging.level.raised(verbose);
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level.to_tracing()).into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
