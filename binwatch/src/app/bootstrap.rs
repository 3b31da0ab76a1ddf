//! Application bootstrap implementation.

use std::sync::atomic::AtomicBool;

use tracing::{info, warn};

use super::config::{AppConfig, CameraTarget};
use super::error::AppError;
use crate::announce::{Announcer, CommandSpeaker, CommentBook, LogSpeaker, Speaker, SpeechQueue};
use crate::camera::{Camera, HttpCamera, ScanZoneTrigger, SnapshotCamera};
use crate::classify::{Classifier, FixedClassifier, OpenAiClassifier};
use crate::config::SpeechBackend;
use crate::http::ReqwestClient;
use crate::motion::{MotionDetector, RegionScanner};
use crate::scoreboard::{ScoreSummary, Scoreboard};
use crate::tracking::{Collaborators, SessionController};

/// The assembled kiosk.
///
/// Start order matters: everything that can fail (HTTP client, API key,
/// speech worker, comment file) is set up before the controller exists, so
/// a misconfigured kiosk never starts polling.
pub struct KioskApp {
    controller: SessionController,
    scoreboard: Scoreboard,
}

impl KioskApp {
    /// Build every collaborator and the session controller.
    pub fn start(config: AppConfig) -> Result<Self, AppError> {
        let camera = build_camera(&config)?;
        let classifier = build_classifier(&config)?;
        let announcer = build_announcer(&config)?;
        let comments = match &config.comments_path {
            Some(path) => CommentBook::load(path)?,
            None => CommentBook::default(),
        };

        let detector = MotionDetector::new(config.motion);
        let proximity = ScanZoneTrigger::new(config.scan_zone.clone(), detector.clone(), config.settle);
        let scanner = RegionScanner::new(detector, config.settle);
        let scoreboard = Scoreboard::new();

        let collab = Collaborators {
            camera,
            proximity: Box::new(proximity),
            classifier,
            announcer,
            results: Box::new(scoreboard.clone()),
            comments,
        };

        info!(
            regions = config.regions.len(),
            bins = ?config.regions.bin_names(),
            dry_run = config.dry_run,
            "Kiosk started"
        );

        let controller = SessionController::new(config.controller, config.regions, scanner, collab);
        Ok(Self {
            controller,
            scoreboard,
        })
    }

    /// Run until `shutdown` is set. Returns the number of polls made.
    pub fn run(&mut self, shutdown: &AtomicBool) -> u64 {
        self.controller.run(shutdown)
    }

    pub fn controller(&self) -> &SessionController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SessionController {
        &mut self.controller
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn summary(&self) -> ScoreSummary {
        self.scoreboard.summary()
    }
}

fn build_camera(config: &AppConfig) -> Result<Box<dyn Camera>, AppError> {
    Ok(match &config.camera {
        CameraTarget::Snapshot(path) => {
            info!(path = %path.display(), "Using snapshot camera");
            Box::new(SnapshotCamera::new(path.clone()))
        }
        CameraTarget::Http(url) => {
            info!(url = %url, "Using HTTP camera");
            Box::new(HttpCamera::new(ReqwestClient::with_timeout(config.http_timeout)?, url.clone()))
        }
    })
}

fn build_classifier(config: &AppConfig) -> Result<Box<dyn Classifier>, AppError> {
    if config.dry_run {
        info!(
            components = config.offline_components.len(),
            "Dry run, using offline classifier"
        );
        return Ok(Box::new(FixedClassifier::new(config.offline_components.clone())));
    }

    let client = ReqwestClient::with_timeout(config.http_timeout)?;
    let classifier = OpenAiClassifier::from_env(client, config.classifier.clone(), &config.api_key_env)?;
    info!(
        model = %config.classifier.model,
        municipality = %config.classifier.municipality,
        "Using remote classifier"
    );
    Ok(Box::new(classifier))
}

fn build_announcer(config: &AppConfig) -> Result<Box<dyn Announcer>, AppError> {
    let speaker: Box<dyn Speaker> = match config.speech_backend {
        SpeechBackend::Log => Box::new(LogSpeaker),
        SpeechBackend::Command => match CommandSpeaker::from_command_line(&config.speech_command) {
            Some(speaker) => Box::new(speaker),
            None => {
                warn!("speech.command is empty, announcements will only be logged");
                Box::new(LogSpeaker)
            }
        },
    };
    Ok(Box::new(SpeechQueue::new(speaker)?))
}
