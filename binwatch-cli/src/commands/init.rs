//! Init command - write a default configuration file.

use std::path::Path;

use binwatch::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
pub fn run(force: bool, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    if path.exists() && !force {
        return Err(CliError::Config(format!(
            "Configuration file {} already exists. Use --force to overwrite it.",
            path.display()
        )));
    }

    ConfigFile::default().save_to(&path)?;

    println!("Configuration file: {}", path.display());
    println!();
    println!("Edit [regions] to match your bins, then start the kiosk with 'binwatch run'.");
    println!("The classifier reads its API key from $OPENAI_API_KEY by default.");
    Ok(())
}
