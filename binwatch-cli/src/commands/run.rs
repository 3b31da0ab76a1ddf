//! Run command - operate the kiosk until interrupted.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use binwatch::app::{AppConfig, KioskApp};

use super::common::parse_item;
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the run command.
pub struct RunArgs {
    pub config: Option<PathBuf>,
    pub verbose: bool,
    pub window: Option<u64>,
    pub dry_run: bool,
    pub items: Vec<String>,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.config.as_deref(), args.verbose)?;
    runner.log_startup("run");

    let mut app_config = AppConfig::from_config_file(runner.config())?;
    if let Some(secs) = args.window {
        if secs == 0 {
            return Err(CliError::Config("--window must be at least 1".to_string()));
        }
        app_config = app_config.with_tracking_window(Duration::from_secs(secs));
    }
    if args.dry_run || !args.items.is_empty() {
        let components = args
            .items
            .iter()
            .map(|item| parse_item(item))
            .collect::<Result<Vec<_>, _>>()?;
        app_config = app_config.with_dry_run(components);
    }

    let bins = app_config.regions.bin_names().join(", ");
    let window = app_config.controller.tracking_window;
    let dry_run = app_config.dry_run;
    let mut app = KioskApp::start(app_config)?;

    // Set up signal handler for graceful shutdown
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    ctrlc::set_handler(move || {
        println!();
        println!("Received shutdown signal, finishing current poll...");
        shutdown_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    println!("binwatch {}", binwatch::VERSION);
    println!("  Bins:            {}", bins);
    println!("  Tracking window: {}s", window.as_secs());
    if dry_run {
        println!("  Classifier:      offline (dry run)");
    }
    println!();
    println!("Press Ctrl+C to stop.");

    app.run(&shutdown);

    println!();
    println!("Session summary: {}", app.summary());
    Ok(())
}
