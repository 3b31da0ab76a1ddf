//! The `config.ini` file and its sections.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use tracing::debug;

use super::parse::SectionReader;
use super::ConfigError;
use crate::classify::ClassifierConfig;
use crate::motion::{MotionConfig, DEFAULT_PIXEL_THRESHOLD, DEFAULT_RATIO_THRESHOLD, DEFAULT_SETTLE_DELAY};
use crate::region::{Rect, RegionSet};
use crate::tracking::{TimeoutPolicy, DEFAULT_AWAIT_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_TRACKING_WINDOW};
use crate::verdict::DEFAULT_IGNORED;

/// Default camera frame size.
pub const DEFAULT_FRAME_SIZE: u32 = 1000;

/// Default bin layout for a 1000x1000 frame.
const DEFAULT_REGIONS: &[(&str, &str)] = &[
    ("compost", "0,90,290,450"),
    ("recycling", "100,190,290,450"),
    ("garbage", "200,290,290,450"),
];

/// Path of the configuration file: `<config dir>/binwatch/config.ini`.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("binwatch")
        .join("config.ini")
}

fn default_log_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".binwatch")
        .join("logs")
}

/// Where frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraSource {
    /// Latest still written to disk by an external capture process.
    #[default]
    Snapshot,
    /// JPEG snapshot fetched over HTTP.
    Http,
}

impl FromStr for CameraSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "snapshot" | "file" => Ok(CameraSource::Snapshot),
            "http" => Ok(CameraSource::Http),
            _ => Err("expected 'snapshot' or 'http'".to_string()),
        }
    }
}

impl fmt::Display for CameraSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CameraSource::Snapshot => "snapshot",
            CameraSource::Http => "http",
        })
    }
}

/// How announcements are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechBackend {
    /// Announcements go to the log only.
    #[default]
    Log,
    /// Announcements are spoken by an external command.
    Command,
}

impl FromStr for SpeechBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "log" | "none" => Ok(SpeechBackend::Log),
            "command" | "tts" => Ok(SpeechBackend::Command),
            _ => Err("expected 'log' or 'command'".to_string()),
        }
    }
}

impl fmt::Display for SpeechBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SpeechBackend::Log => "log",
            SpeechBackend::Command => "command",
        })
    }
}

/// `[camera]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraSettings {
    pub source: CameraSource,
    pub snapshot_path: PathBuf,
    pub snapshot_url: Option<String>,
    pub frame_width: u32,
    pub frame_height: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            source: CameraSource::default(),
            snapshot_path: std::env::temp_dir().join("binwatch").join("frame.jpg"),
            snapshot_url: None,
            frame_width: DEFAULT_FRAME_SIZE,
            frame_height: DEFAULT_FRAME_SIZE,
        }
    }
}

/// `[scan]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Scan zone; the whole frame when unset.
    pub zone: Option<Rect>,
    pub await_timeout: Duration,
    pub settle: Duration,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            zone: None,
            await_timeout: DEFAULT_AWAIT_TIMEOUT,
            settle: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// `[motion]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionSettings {
    pub pixel_threshold: u8,
    pub ratio_threshold: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            pixel_threshold: DEFAULT_PIXEL_THRESHOLD,
            ratio_threshold: DEFAULT_RATIO_THRESHOLD,
        }
    }
}

impl MotionSettings {
    pub fn to_motion_config(&self) -> MotionConfig {
        MotionConfig::default()
            .with_pixel_threshold(self.pixel_threshold)
            .with_ratio_threshold(self.ratio_threshold)
    }
}

/// `[tracking]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSettings {
    pub window: Duration,
    pub poll_interval: Duration,
    pub timeout_policy: TimeoutPolicy,
    pub end_when_sorted: bool,
    pub ignore: Vec<String>,
}

impl Default for TrackingSettings {
    fn default() -> Self {
        Self {
            window: DEFAULT_TRACKING_WINDOW,
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout_policy: TimeoutPolicy::default(),
            end_when_sorted: false,
            ignore: DEFAULT_IGNORED.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[classifier]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierSettings {
    pub endpoint: String,
    pub model: String,
    pub municipality: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        let request = ClassifierConfig::default();
        Self {
            endpoint: request.endpoint,
            model: request.model,
            municipality: request.municipality,
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout: Duration::from_secs(30),
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

impl ClassifierSettings {
    pub fn to_classifier_config(&self) -> ClassifierConfig {
        ClassifierConfig {
            endpoint: self.endpoint.clone(),
            model: self.model.clone(),
            municipality: self.municipality.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// `[speech]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechSettings {
    pub backend: SpeechBackend,
    /// Command line of the text-to-speech program.
    pub command: String,
    pub comments_path: Option<PathBuf>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            backend: SpeechBackend::default(),
            command: "espeak".to_string(),
            comments_path: None,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub directory: PathBuf,
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: default_log_directory(),
            file: "binwatch.log".to_string(),
        }
    }
}

/// The whole configuration file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub camera: CameraSettings,
    pub scan: ScanSettings,
    pub motion: MotionSettings,
    pub tracking: TrackingSettings,
    /// Ordered `(bin_name, rect)` pairs; order is detection priority.
    pub regions: Vec<(String, Rect)>,
    pub classifier: ClassifierSettings,
    pub speech: SpeechSettings,
    pub logging: LoggingSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default(),
            scan: ScanSettings::default(),
            motion: MotionSettings::default(),
            tracking: TrackingSettings::default(),
            regions: DEFAULT_REGIONS
                .iter()
                .filter_map(|(name, rect)| rect.parse().ok().map(|r| (name.to_string(), r)))
                .collect(),
            classifier: ClassifierSettings::default(),
            speech: SpeechSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Load from the default path. A missing file yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_file_path();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load and validate a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path).map_err(|e| match e {
            ini::Error::Io(source) => ConfigError::Io {
                path: path.to_path_buf(),
                source,
            },
            ini::Error::Parse(e) => ConfigError::Parse {
                path: path.to_path_buf(),
                reason: e.to_string(),
            },
        })?;

        let config = Self::from_ini(&ini)?;
        debug!(path = %path.display(), regions = config.regions.len(), "Config loaded");
        Ok(config)
    }

    /// Build from parsed INI, applying defaults for missing keys.
    pub fn from_ini(ini: &Ini) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let camera = {
            let s = SectionReader::new("camera", ini.section(Some("camera")));
            let d = &defaults.camera;
            CameraSettings {
                source: s.parsed("source", d.source)?,
                snapshot_path: s.path("snapshot_path", d.snapshot_path.clone()),
                snapshot_url: s.optional_string("snapshot_url"),
                frame_width: s.parsed("frame_width", d.frame_width)?,
                frame_height: s.parsed("frame_height", d.frame_height)?,
            }
        };

        let scan = {
            let s = SectionReader::new("scan", ini.section(Some("scan")));
            let d = &defaults.scan;
            let zone = match s.raw("zone") {
                None => None,
                Some(value) => Some(
                    value
                        .parse::<Rect>()
                        .map_err(|e| s.invalid("zone", value, e.to_string()))?,
                ),
            };
            ScanSettings {
                zone,
                await_timeout: s.secs("await_timeout_secs", d.await_timeout)?,
                settle: s.millis("settle_ms", d.settle)?,
            }
        };

        let motion = {
            let s = SectionReader::new("motion", ini.section(Some("motion")));
            let d = &defaults.motion;
            let ratio_threshold = s.parsed("ratio_threshold", d.ratio_threshold)?;
            if !(ratio_threshold > 0.0 && ratio_threshold <= 1.0) {
                return Err(s.invalid(
                    "ratio_threshold",
                    &ratio_threshold.to_string(),
                    "must be in (0, 1]",
                ));
            }
            MotionSettings {
                pixel_threshold: s.parsed("pixel_threshold", d.pixel_threshold)?,
                ratio_threshold,
            }
        };

        let tracking = {
            let s = SectionReader::new("tracking", ini.section(Some("tracking")));
            let d = &defaults.tracking;
            let window = s.secs("window_secs", d.window)?;
            if window.is_zero() {
                return Err(s.invalid("window_secs", "0", "must be at least 1"));
            }
            TrackingSettings {
                window,
                poll_interval: s.millis("poll_interval_ms", d.poll_interval)?,
                timeout_policy: s.parsed("timeout_policy", d.timeout_policy)?,
                end_when_sorted: s.bool("end_when_sorted", d.end_when_sorted)?,
                ignore: s.list("ignore", DEFAULT_IGNORED),
            }
        };

        let regions = match ini.section(Some("regions")) {
            None => defaults.regions,
            Some(props) => {
                let s = SectionReader::new("regions", Some(props));
                props
                    .iter()
                    .map(|(name, value)| {
                        value
                            .trim()
                            .parse::<Rect>()
                            .map(|rect| (name.trim().to_string(), rect))
                            .map_err(|e| s.invalid(name, value, e.to_string()))
                    })
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let classifier = {
            let s = SectionReader::new("classifier", ini.section(Some("classifier")));
            let d = &defaults.classifier;
            ClassifierSettings {
                endpoint: s.string("endpoint", &d.endpoint),
                model: s.string("model", &d.model),
                municipality: s.string("municipality", &d.municipality),
                api_key_env: s.string("api_key_env", &d.api_key_env),
                timeout: s.secs("timeout_secs", d.timeout)?,
                temperature: s.parsed("temperature", d.temperature)?,
                max_tokens: s.parsed("max_tokens", d.max_tokens)?,
            }
        };

        let speech = {
            let s = SectionReader::new("speech", ini.section(Some("speech")));
            let d = &defaults.speech;
            SpeechSettings {
                backend: s.parsed("backend", d.backend)?,
                command: s.string("command", &d.command),
                comments_path: s.optional_path("comments_path"),
            }
        };

        let logging = {
            let s = SectionReader::new("logging", ini.section(Some("logging")));
            let d = &defaults.logging;
            LoggingSettings {
                directory: s.path("directory", d.directory.clone()),
                file: s.string("file", &d.file),
            }
        };

        let config = Self {
            camera,
            scan,
            motion,
            tracking,
            regions,
            classifier,
            speech,
            logging,
        };
        config.region_set()?;
        Ok(config)
    }

    /// Validated bin regions for the configured frame size.
    pub fn region_set(&self) -> Result<RegionSet, ConfigError> {
        Ok(RegionSet::new(
            self.regions.clone(),
            self.camera.frame_width,
            self.camera.frame_height,
        )?)
    }

    /// Scan zone, defaulting to the whole frame.
    pub fn scan_zone(&self) -> Result<Rect, ConfigError> {
        match self.scan.zone {
            Some(zone) => Ok(zone),
            None => Ok(Rect::full_frame(
                self.camera.frame_width,
                self.camera.frame_height,
            )?),
        }
    }

    /// Render as INI.
    pub fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("camera"))
            .set("source", self.camera.source.to_string())
            .set("snapshot_path", self.camera.snapshot_path.display().to_string())
            .set("snapshot_url", self.camera.snapshot_url.clone().unwrap_or_default())
            .set("frame_width", self.camera.frame_width.to_string())
            .set("frame_height", self.camera.frame_height.to_string());

        ini.with_section(Some("scan"))
            .set(
                "zone",
                self.scan.zone.map(|z| z.to_string()).unwrap_or_default(),
            )
            .set("await_timeout_secs", self.scan.await_timeout.as_secs().to_string())
            .set("settle_ms", self.scan.settle.as_millis().to_string());

        ini.with_section(Some("motion"))
            .set("pixel_threshold", self.motion.pixel_threshold.to_string())
            .set("ratio_threshold", self.motion.ratio_threshold.to_string());

        ini.with_section(Some("tracking"))
            .set("window_secs", self.tracking.window.as_secs().to_string())
            .set("poll_interval_ms", self.tracking.poll_interval.as_millis().to_string())
            .set("timeout_policy", self.tracking.timeout_policy.to_string())
            .set("end_when_sorted", self.tracking.end_when_sorted.to_string())
            .set("ignore", self.tracking.ignore.join(","));

        for (name, rect) in &self.regions {
            ini.with_section(Some("regions"))
                .set(name.as_str(), rect.to_string());
        }

        ini.with_section(Some("classifier"))
            .set("endpoint", self.classifier.endpoint.as_str())
            .set("model", self.classifier.model.as_str())
            .set("municipality", self.classifier.municipality.as_str())
            .set("api_key_env", self.classifier.api_key_env.as_str())
            .set("timeout_secs", self.classifier.timeout.as_secs().to_string())
            .set("temperature", self.classifier.temperature.to_string())
            .set("max_tokens", self.classifier.max_tokens.to_string());

        ini.with_section(Some("speech"))
            .set("backend", self.speech.backend.to_string())
            .set("command", self.speech.command.as_str())
            .set(
                "comments_path",
                self.speech
                    .comments_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            );

        ini.with_section(Some("logging"))
            .set("directory", self.logging.directory.display().to_string())
            .set("file", self.logging.file.as_str());

        ini
    }

    /// Render as INI text.
    pub fn render(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.to_ini().write_to(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Save to the default path.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        self.to_ini().write_to_file(path).map_err(io_error)
    }
}
