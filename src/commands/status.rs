use anyhow::Result;
use gutenberg_graph::{
    config::{Config, TriggerPolicy},
    load::OneShotTrigger,
};
use std::process::ExitCode;

pub fn show_status(config: Config) -> Result<ExitCode> {
    let trigger = OneShotTrigger::new(&config.trigger.marker_path);

    println!("\nGutenberg Graph Status:");
    println!("=======================");
    println!("Archive: {}", config.load.archive_path.display());
    if !config.load.archive_path.exists() {
        println!("  (not found)");
    }
    println!("Graph store: {}", config.store.data_url);
    println!("Write mode: {}", config.store.write_mode);
    if let Some(max) = config.load.max_documents {
        println!("Document cap: {}", max);
    }

    match config.trigger.policy {
        TriggerPolicy::Always => println!("Trigger: disabled (policy = always)"),
        TriggerPolicy::TwoPhase if trigger.is_armed() => println!(
            "Trigger: marker present at {}; the next load will run",
            trigger.marker_path().display()
        ),
        TriggerPolicy::TwoPhase => println!(
            "Trigger: no marker at {}; the next load only creates it",
            trigger.marker_path().display()
        ),
    }

    Ok(ExitCode::SUCCESS)
}
