//! User-facing announcements.
//!
//! The controller talks to the user through the [`Announcer`] trait. The
//! production announcer is a [`SpeechQueue`]: a background worker feeding a
//! [`Speaker`] backend so speech never stalls the polling loop.

mod comments;
mod messages;
mod queue;
mod speaker;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub use comments::CommentBook;
pub use messages::{instructions, verdict_message};
pub use queue::SpeechQueue;
pub use speaker::{CommandSpeaker, LogSpeaker, Speaker};

/// Errors from the announcement layer.
#[derive(Debug, Error)]
pub enum AnnounceError {
    /// Speech worker thread could not be started.
    #[error("failed to start speech worker: {0}")]
    Spawn(#[source] io::Error),

    /// External speech command failed.
    #[error("speech command '{program}' failed: {reason}")]
    Command { program: String, reason: String },

    /// Comment file could not be read or parsed.
    #[error("failed to load comments from {}: {reason}", .path.display())]
    Comments { path: PathBuf, reason: String },
}

/// Fire-and-forget message sink.
pub trait Announcer: Send {
    /// Queue `text` for the user. Must not block on delivery.
    fn announce(&self, text: &str);
}
