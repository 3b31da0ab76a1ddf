//! Config command - inspect the configuration.

use std::path::Path;

use binwatch::config::config_file_path;
use clap::Subcommand;

use super::common::load_config;
use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Show the effective configuration (the default)
    Show,
}

/// Run a config subcommand.
pub fn run(command: Option<ConfigCommands>, config_path: Option<&Path>) -> Result<(), CliError> {
    match command.unwrap_or(ConfigCommands::Show) {
        ConfigCommands::Path => run_path(config_path),
        ConfigCommands::Show => run_show(config_path),
    }
}

/// Show the configuration file path.
fn run_path(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    println!("{}", path.display());
    Ok(())
}

/// Show the effective configuration.
fn run_show(config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);
    let config = load_config(config_path)?;

    if path.exists() {
        println!("; {}", path.display());
    } else {
        println!("; {} (not found, showing defaults)", path.display());
    }
    print!("{}", config.render());
    Ok(())
}
