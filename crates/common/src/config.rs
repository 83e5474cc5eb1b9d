//! Application configuration.
//!
//! Every tunable of the control loop lives here: detection thresholds,
//! per-axis speeds and offsets, audio gate settings, overlay and display
//! geometry. Values are read once at startup; nothing the running system
//! does is written back.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GazemouseError, GazemouseResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Detection thresholds for gaze directions and gestures.
    pub thresholds: ThresholdConfig,

    /// Per-axis speed multipliers and pixel offsets.
    pub motion: MotionConfig,

    /// Speed reduction applied while the jaw is held open.
    pub precision: PrecisionConfig,

    /// Which discrete cues are emitted.
    pub cues: CueConfig,

    /// Audio feedback settings.
    pub audio: AudioConfig,

    /// Cursor proxy window settings.
    pub overlay: OverlayConfig,

    /// Display geometry used when the display layer cannot be queried.
    pub display: DisplayConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Score thresholds, each in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub up: f32,
    pub down: f32,
    pub left: f32,
    pub right: f32,
    pub brow: f32,
    pub jaw: f32,
    pub mouth: f32,
}

/// Speed multipliers and pixel offsets forwarded with every motion sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub right_speed: f64,
    pub left_speed: f64,
    pub up_speed: f64,
    pub down_speed: f64,
    pub x_offset: f64,
    pub y_offset: f64,
}

/// Percent of the configured speed kept while the jaw is open.
///
/// 100 leaves motion untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrecisionConfig {
    pub horizontal_reducer_pct: f64,
    pub vertical_reducer_pct: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CueConfig {
    /// Emit a cue on the rising edge of each directional gaze gate.
    pub directional: bool,
}

/// Audio feedback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Playback volume in `[0.0, 1.0]`.
    pub volume: f32,

    /// Start muted.
    pub muted: bool,

    /// Directory holding `<Cue>.mp3` files.
    pub sounds_dir: PathBuf,

    /// External player invoked as `<command> <file>`. Logging only when unset.
    pub player_command: Option<String>,
}

/// Cursor proxy window settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub width: u32,
    pub height: u32,

    /// Interval for re-asserting the always-on-top state.
    pub keep_on_top_interval_ms: u64,
}

/// Display geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub refresh_hz: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "gazemouse=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            up: 0.5,
            down: 0.5,
            left: 0.5,
            right: 0.5,
            brow: 0.5,
            jaw: 0.5,
            mouth: 0.6,
        }
    }
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            right_speed: 1.0,
            left_speed: 1.0,
            up_speed: 1.0,
            down_speed: 1.0,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }
}

impl Default for PrecisionConfig {
    fn default() -> Self {
        Self {
            horizontal_reducer_pct: 100.0,
            vertical_reducer_pct: 100.0,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 1.0,
            muted: false,
            sounds_dir: PathBuf::from("sounds"),
            player_command: None,
        }
    }
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            keep_on_top_interval_ms: 1000,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            refresh_hz: 60,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// Runs before logging is set up, so a rejected file is handed back to
    /// the caller instead of being logged here.
    pub fn load() -> (Self, Option<GazemouseError>) {
        Self::load_or_default(&config_file_path())
    }

    /// Load config from `path`. A missing file yields defaults silently; an
    /// unreadable or invalid one yields defaults plus the error.
    pub fn load_or_default(path: &Path) -> (Self, Option<GazemouseError>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// Load and validate config from an explicit path.
    pub fn load_from(path: &Path) -> GazemouseResult<Self> {
        if !path.exists() {
            return Err(GazemouseError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the standard location.
    pub fn save(&self) -> GazemouseResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> GazemouseResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Check every tunable is inside its valid range.
    pub fn validate(&self) -> GazemouseResult<()> {
        let t = &self.thresholds;
        for (name, value) in [
            ("up", t.up),
            ("down", t.down),
            ("left", t.left),
            ("right", t.right),
            ("brow", t.brow),
            ("jaw", t.jaw),
            ("mouth", t.mouth),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(GazemouseError::config(format!(
                    "{name}_threshold must be within [0, 1], got {value}"
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.audio.volume) {
            return Err(GazemouseError::config(format!(
                "volume must be within [0, 1], got {}",
                self.audio.volume
            )));
        }

        if self.precision.horizontal_reducer_pct < 0.0 || self.precision.vertical_reducer_pct < 0.0
        {
            return Err(GazemouseError::config(
                "precision reducer percentages must not be negative",
            ));
        }

        if self.display.refresh_hz == 0 {
            return Err(GazemouseError::config("display refresh_hz must be > 0"));
        }

        if self.overlay.width == 0 || self.overlay.height == 0 {
            return Err(GazemouseError::config("overlay size must be non-zero"));
        }

        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("gazemouse").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let raw = r#"{ "thresholds": { "up": 0.3 }, "audio": { "muted": true } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(config.thresholds.up, 0.3);
        assert_eq!(config.thresholds.down, 0.5);
        assert!(config.audio.muted);
        assert_eq!(config.overlay.width, 32);
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = AppConfig::default();
        config.thresholds.jaw = 1.5;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("jaw_threshold"));
    }

    #[test]
    fn test_rejects_zero_refresh_rate() {
        let mut config = AppConfig::default();
        config.display.refresh_hz = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = std::env::temp_dir().join("gazemouse_test_config");
        let _ = std::fs::remove_dir_all(&dir);

        let path = dir.join("config.json");
        let mut config = AppConfig::default();
        config.motion.x_offset = -12.0;
        config.cues.directional = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_malformed_file_falls_back_with_error() {
        let dir = std::env::temp_dir().join("gazemouse_test_malformed_config");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let path = dir.join("config.json");
        std::fs::write(&path, "{ \"display\": ").unwrap();

        let (config, error) = AppConfig::load_or_default(&path);
        assert_eq!(config, AppConfig::default());
        assert!(matches!(error, Some(GazemouseError::Json(_))));

        std::fs::write(&path, r#"{"thresholds": {"jaw": 1.5}}"#).unwrap();
        let (config, error) = AppConfig::load_or_default(&path);
        assert_eq!(config, AppConfig::default());
        assert!(matches!(error, Some(GazemouseError::Config { .. })));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_file_falls_back_silently() {
        let path = std::env::temp_dir().join("gazemouse_absent_config.json");
        let _ = std::fs::remove_file(&path);
        let (config, error) = AppConfig::load_or_default(&path);
        assert_eq!(config, AppConfig::default());
        assert!(error.is_none());
    }

    #[test]
    fn test_load_from_missing_file() {
        let path = std::env::temp_dir().join("gazemouse_missing_config.json");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(GazemouseError::FileNotFound { .. })
        ));
    }
}
