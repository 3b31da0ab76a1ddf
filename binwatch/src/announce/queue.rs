//! Background speech worker.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use super::{AnnounceError, Announcer, Speaker};

/// [`Announcer`] that speaks on a dedicated thread, in issue order.
///
/// Dropping the queue lets the worker finish the pending messages and then
/// joins it.
pub struct SpeechQueue {
    sender: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl SpeechQueue {
    pub fn new(mut speaker: Box<dyn Speaker>) -> Result<Self, AnnounceError> {
        let (sender, receiver) = mpsc::channel::<String>();

        let worker = thread::Builder::new()
            .name("speech".to_string())
            .spawn(move || {
                for text in receiver {
                    if let Err(e) = speaker.speak(&text) {
                        warn!(error = %e, "Announcement failed");
                    }
                }
                debug!("Speech worker stopped");
            })
            .map_err(AnnounceError::Spawn)?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
        })
    }
}

impl Announcer for SpeechQueue {
    fn announce(&self, text: &str) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(text.to_string()).is_err() {
            warn!(text, "Speech worker is gone, dropping announcement");
        }
    }
}

impl Drop for SpeechQueue {
    fn drop(&mut self) {
        // Closing the channel ends the worker loop
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("Speech worker panicked");
            }
        }
    }
}
