//! Application configuration for KioskApp.

use std::path::PathBuf;
use std::time::Duration;

use super::error::AppError;
use crate::classify::{ClassifierConfig, Component};
use crate::config::{CameraSource, ConfigError, ConfigFile, SpeechBackend};
use crate::motion::MotionConfig;
use crate::region::{Region, RegionError, RegionSet};
use crate::tracking::ControllerConfig;
use crate::verdict::IgnoreList;

/// Where frames come from, resolved from `[camera]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CameraTarget {
    Snapshot(PathBuf),
    Http(String),
}

/// Everything needed to start the kiosk.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub regions: RegionSet,

    /// Zone watched for presented items.
    pub scan_zone: Region,

    pub motion: MotionConfig,

    /// Pause before re-capturing a fired region or scan zone.
    pub settle: Duration,

    pub controller: ControllerConfig,

    pub camera: CameraTarget,

    pub classifier: ClassifierConfig,

    /// Environment variable holding the classifier API key.
    pub api_key_env: String,

    pub http_timeout: Duration,

    pub speech_backend: SpeechBackend,

    /// Command line of the text-to-speech program.
    pub speech_command: String,

    pub comments_path: Option<PathBuf>,

    /// Use an offline classifier instead of the remote service.
    pub dry_run: bool,

    /// Components the offline classifier reports for every item.
    pub offline_components: Vec<Component>,
}

impl AppConfig {
    /// Create application config from the configuration file.
    ///
    /// Fails if the regions or scan zone do not fit the frame, or if the HTTP
    /// camera is selected without a URL.
    pub fn from_config_file(config: &ConfigFile) -> Result<Self, AppError> {
        let regions = config.region_set()?;
        let scan_zone = Region::new(0, "scan zone", config.scan_zone()?);
        if !scan_zone
            .rect()
            .fits_within(config.camera.frame_width, config.camera.frame_height)
        {
            return Err(AppError::Config(ConfigError::Region(RegionError::OutOfBounds {
                rect: *scan_zone.rect(),
                width: config.camera.frame_width,
                height: config.camera.frame_height,
            })));
        }

        let camera = match config.camera.source {
            CameraSource::Snapshot => CameraTarget::Snapshot(config.camera.snapshot_path.clone()),
            CameraSource::Http => match &config.camera.snapshot_url {
                Some(url) => CameraTarget::Http(url.clone()),
                None => {
                    return Err(AppError::MissingSetting(
                        "camera.snapshot_url is required when camera.source = http".to_string(),
                    ))
                }
            },
        };

        let controller = ControllerConfig {
            tracking_window: config.tracking.window,
            poll_interval: config.tracking.poll_interval,
            await_timeout: config.scan.await_timeout,
            timeout_policy: config.tracking.timeout_policy,
            end_when_sorted: config.tracking.end_when_sorted,
            ignore: IgnoreList::new(&config.tracking.ignore),
        };

        Ok(Self {
            regions,
            scan_zone,
            motion: config.motion.to_motion_config(),
            settle: config.scan.settle,
            controller,
            camera,
            classifier: config.classifier.to_classifier_config(),
            api_key_env: config.classifier.api_key_env.clone(),
            http_timeout: config.classifier.timeout,
            speech_backend: config.speech.backend,
            speech_command: config.speech.command.clone(),
            comments_path: config.speech.comments_path.clone(),
            dry_run: false,
            offline_components: Vec::new(),
        })
    }

    /// Override the tracking window.
    pub fn with_tracking_window(mut self, window: Duration) -> Self {
        self.controller.tracking_window = window;
        self
    }

    /// Run with the offline classifier.
    pub fn with_dry_run(mut self, components: Vec<Component>) -> Self {
        self.dry_run = true;
        self.offline_components = components;
        self
    }
}
