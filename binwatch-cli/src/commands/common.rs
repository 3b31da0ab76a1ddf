//! Common utilities shared across CLI commands.

use std::path::Path;

use binwatch::classify::Component;
use binwatch::config::ConfigFile;
use binwatch::frame::Frame;

use crate::error::CliError;

/// Load the configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<ConfigFile, CliError> {
    Ok(match path {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    })
}

/// Load an image file as a frame.
pub fn load_frame(path: &Path) -> Result<Frame, CliError> {
    Frame::open(path).map_err(|e| CliError::Image {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Parse an offline component given as `name=bin` or `name=bin:material`.
pub fn parse_item(item: &str) -> Result<Component, CliError> {
    let invalid = || {
        CliError::Config(format!(
            "Invalid item '{}'. Expected name=bin or name=bin:material.",
            item
        ))
    };

    let (name, rest) = item.split_once('=').ok_or_else(invalid)?;
    let (bin, material) = rest.split_once(':').unwrap_or((rest, ""));
    let (name, bin) = (name.trim(), bin.trim());
    if name.is_empty() || bin.is_empty() {
        return Err(invalid());
    }

    Ok(Component::new(name, material.trim(), bin))
}
