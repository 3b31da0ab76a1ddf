//! Speech backends.

use std::process::Command;

use tracing::info;

use super::AnnounceError;

/// Something that can say a sentence, blocking until done.
pub trait Speaker: Send {
    fn speak(&mut self, text: &str) -> Result<(), AnnounceError>;
}

/// Writes announcements to the log instead of speaking them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSpeaker;

impl Speaker for LogSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), AnnounceError> {
        info!(text, "Announcement");
        Ok(())
    }
}

/// Speaks through an external text-to-speech program such as `espeak`.
///
/// The text is passed as the last argument.
#[derive(Debug, Clone)]
pub struct CommandSpeaker {
    program: String,
    args: Vec<String>,
}

impl CommandSpeaker {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Parse a command line such as `"espeak -s 150"`.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl Speaker for CommandSpeaker {
    fn speak(&mut self, text: &str) -> Result<(), AnnounceError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .output()
            .map_err(|e| AnnounceError::Command {
                program: self.program.clone(),
                reason: format!("failed to run: {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AnnounceError::Command {
                program: self.program.clone(),
                reason: format!("{}: {}", output.status, stderr.trim()),
            });
        }

        Ok(())
    }
}
