//! Typed readers for INI values.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use ini::Properties;

use super::ConfigError;

/// Replace a leading `~` with the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    let path = path.trim();
    if path == "~" {
        return dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Reads keys from one section, naming `section.key` in errors.
pub(super) struct SectionReader<'a> {
    section: &'static str,
    props: Option<&'a Properties>,
}

impl<'a> SectionReader<'a> {
    pub(super) fn new(section: &'static str, props: Option<&'a Properties>) -> Self {
        Self { section, props }
    }

    /// Raw value; blank values count as unset.
    pub(super) fn raw(&self, key: &str) -> Option<&'a str> {
        self.props
            .and_then(|p| p.get(key))
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub(super) fn invalid(&self, key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: format!("{}.{}", self.section, key),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    pub(super) fn string(&self, key: &str, default: &str) -> String {
        self.raw(key).unwrap_or(default).to_string()
    }

    pub(super) fn optional_string(&self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    pub(super) fn path(&self, key: &str, default: PathBuf) -> PathBuf {
        self.raw(key).map(expand_tilde).unwrap_or(default)
    }

    pub(super) fn optional_path(&self, key: &str) -> Option<PathBuf> {
        self.raw(key).map(expand_tilde)
    }

    /// Any `FromStr` value.
    pub(super) fn parsed<T>(&self, key: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.raw(key) {
            None => Ok(default),
            Some(value) => value
                .parse()
                .map_err(|e: T::Err| self.invalid(key, value, e.to_string())),
        }
    }

    pub(super) fn bool(&self, key: &str, default: bool) -> Result<bool, ConfigError> {
        match self.raw(key) {
            None => Ok(default),
            Some(value) => match value.to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(true),
                "false" | "no" | "off" | "0" => Ok(false),
                _ => Err(self.invalid(key, value, "expected true or false")),
            },
        }
    }

    pub(super) fn secs(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        Ok(Duration::from_secs(self.parsed(key, default.as_secs())?))
    }

    pub(super) fn millis(&self, key: &str, default: Duration) -> Result<Duration, ConfigError> {
        Ok(Duration::from_millis(
            self.parsed(key, default.as_millis() as u64)?,
        ))
    }

    /// Comma-separated list; an explicit empty value gives an empty list.
    pub(super) fn list(&self, key: &str, default: &[&str]) -> Vec<String> {
        match self.props.and_then(|p| p.get(key)) {
            None => default.iter().map(|s| s.to_string()).collect(),
            Some(value) => value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}
