//! File-level configuration model.
//!
//! Mirrors the TOML layout one-to-one. Enum-like fields stay strings here and
//! are resolved in [`AppConfig::validate`].

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::settings::{
    DisplaySettings, HighlightSettings, NetworkSettings, RecordingSettings, Settings,
    SmoothingSettings, WarningSettings,
};
use crate::types::{HighlightMode, NamedColor, SmoothingMode};

/// Smallest datagram buffer accepted for `network.packet_size`.
const MIN_PACKET_SIZE: usize = 64;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub smoothing: SmoothingConfig,
    pub highlight: HighlightConfig,
    pub warning: WarningConfig,
    pub display: DisplayConfig,
    pub recording: RecordingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub port: u16,
    pub packet_size: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: 2010,
            packet_size: 4048,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    pub mode: String,
    pub alpha: f64,
    /// Number of positions averaged in `moving_average` mode
    pub window: usize,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            mode: SmoothingMode::Exponential.as_str().to_string(),
            alpha: 0.35,
            window: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    pub mode: String,
    pub color: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            mode: HighlightMode::None.as_str().to_string(),
            color: "Orange".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningConfig {
    pub show: bool,
    pub threshold_ms: u64,
    pub flashing_interval_ms: u64,
}

impl Default for WarningConfig {
    fn default() -> Self {
        Self {
            show: true,
            threshold_ms: 3000,
            flashing_interval_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub show_crosshairs: bool,
    pub crosshair_color: String,
    pub crosshair_scale: f32,
    pub show_gaze_sphere: bool,
    pub sphere_color: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            show_crosshairs: true,
            crosshair_color: "White".to_string(),
            crosshair_scale: 2.0,
            show_gaze_sphere: true,
            sphere_color: "Red".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingConfig {
    pub enabled: bool,
    /// Root of the `<date>/<index>/` session tree; platform data dir when unset
    pub root: Option<PathBuf>,
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
        }
    }
}

impl RecordingConfig {
    fn resolved_root(&self) -> PathBuf {
        self.root.clone().unwrap_or_else(default_recordings_root)
    }
}

/// `<data dir>/recordings`, or `./recordings` when no home directory is known.
pub fn default_recordings_root() -> PathBuf {
    ProjectDirs::from("eu", "drivesense", "gaze-aoi")
        .map(|dirs| dirs.data_dir().join("recordings"))
        .unwrap_or_else(|| PathBuf::from("recordings"))
}

impl AppConfig {
    /// Load configuration from `path`. A missing path or file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            debug!("No config path given, using defaults");
            return Ok(Self::default());
        };

        if !path.exists() {
            info!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Resolve and range-check every field, reporting all problems at once.
    pub fn validate(&self) -> Result<Settings> {
        let mut problems = Vec::new();

        if self.network.port == 0 {
            problems.push("network.port must be non-zero".to_string());
        }
        if self.network.packet_size < MIN_PACKET_SIZE {
            problems.push(format!(
                "network.packet_size must be at least {}, got {}",
                MIN_PACKET_SIZE, self.network.packet_size
            ));
        }

        let smoothing_mode = lookup(
            &mut problems,
            "smoothing.mode",
            &self.smoothing.mode,
            SmoothingMode::from_name,
        );
        if !(self.smoothing.alpha > 0.0 && self.smoothing.alpha <= 1.0) {
            problems.push(format!(
                "smoothing.alpha must be in (0, 1], got {}",
                self.smoothing.alpha
            ));
        }
        if self.smoothing.window == 0 {
            problems.push("smoothing.window must be at least 1".to_string());
        }

        let highlight_mode = lookup(
            &mut problems,
            "highlight.mode",
            &self.highlight.mode,
            HighlightMode::from_name,
        );
        let glow_color = lookup(
            &mut problems,
            "highlight.color",
            &self.highlight.color,
            NamedColor::from_name,
        );

        if self.warning.threshold_ms == 0 {
            problems.push("warning.threshold_ms must be positive".to_string());
        }
        if self.warning.flashing_interval_ms == 0 {
            problems.push("warning.flashing_interval_ms must be positive".to_string());
        }

        let crosshair_color = lookup(
            &mut problems,
            "display.crosshair_color",
            &self.display.crosshair_color,
            NamedColor::from_name,
        );
        let sphere_color = lookup(
            &mut problems,
            "display.sphere_color",
            &self.display.sphere_color,
            NamedColor::from_name,
        );
        if !(self.display.crosshair_scale.is_finite() && self.display.crosshair_scale > 0.0) {
            problems.push(format!(
                "display.crosshair_scale must be positive, got {}",
                self.display.crosshair_scale
            ));
        }

        match (
            smoothing_mode,
            highlight_mode,
            glow_color,
            crosshair_color,
            sphere_color,
        ) {
            (Some(smoothing_mode), Some(highlight_mode), Some(glow), Some(crosshair), Some(sphere))
                if problems.is_empty() =>
            {
                Ok(Settings {
                    network: NetworkSettings {
                        port: self.network.port,
                        packet_size: self.network.packet_size,
                    },
                    smoothing: SmoothingSettings {
                        mode: smoothing_mode,
                        alpha: self.smoothing.alpha,
                        window: self.smoothing.window,
                    },
                    highlight: HighlightSettings {
                        mode: highlight_mode,
                        color: glow,
                    },
                    warning: WarningSettings {
                        show: self.warning.show,
                        threshold: Duration::from_millis(self.warning.threshold_ms),
                        flashing_interval: Duration::from_millis(
                            self.warning.flashing_interval_ms,
                        ),
                    },
                    display: DisplaySettings {
                        show_crosshairs: self.display.show_crosshairs,
                        crosshair_color: crosshair,
                        crosshair_scale: self.display.crosshair_scale,
                        show_gaze_sphere: self.display.show_gaze_sphere,
                        sphere_color: sphere,
                    },
                    recording: RecordingSettings {
                        enabled: self.recording.enabled,
                        root: self.recording.resolved_root(),
                    },
                })
            }
            _ => Err(ConfigError::Invalid { problems }),
        }
    }
}

fn lookup<T>(
    problems: &mut Vec<String>,
    field: &str,
    value: &str,
    resolve: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let resolved = resolve(value);
    if resolved.is_none() {
        problems.push(format!("{} has unknown value '{}'", field, value));
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_validate() {
        let settings = AppConfig::default().validate().expect("defaults are valid");
        assert_eq!(settings.network.port, 2010);
        assert_eq!(settings.network.packet_size, 4048);
        assert_eq!(settings.smoothing.mode, SmoothingMode::Exponential);
        assert!((settings.smoothing.alpha - 0.35).abs() < 1e-12);
        assert_eq!(settings.smoothing.window, 10);
        assert_eq!(settings.highlight.mode, HighlightMode::None);
        assert_eq!(settings.highlight.color, NamedColor::Orange);
        assert_eq!(settings.warning.threshold, Duration::from_millis(3000));
        assert_eq!(settings.warning.flashing_interval, Duration::from_millis(500));
        assert_eq!(settings.display.crosshair_color, NamedColor::White);
        assert_eq!(settings.display.sphere_color, NamedColor::Red);
        assert!(settings.recording.enabled);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            [network]
            port = 5005

            [highlight]
            mode = "MatchingCategoryOnly"
            "#,
        )
        .unwrap();
        let settings = config.validate().unwrap();
        assert_eq!(settings.network.port, 5005);
        assert_eq!(settings.network.packet_size, 4048);
        assert_eq!(settings.highlight.mode, HighlightMode::MatchingCategoryOnly);
    }

    #[test]
    fn test_problems_are_aggregated() {
        let config = AppConfig::from_toml_str(
            r#"
            [smoothing]
            mode = "kalman"
            alpha = 1.5

            [highlight]
            mode = "Sometimes"

            [display]
            sphere_color = "Mauve"
            "#,
        )
        .unwrap();

        match config.validate() {
            Err(ConfigError::Invalid { problems }) => {
                assert_eq!(problems.len(), 4, "{:?}", problems);
                assert!(problems.iter().any(|p| p.contains("smoothing.mode")));
                assert!(problems.iter().any(|p| p.contains("smoothing.alpha")));
                assert!(problems.iter().any(|p| p.contains("highlight.mode")));
                assert!(problems.iter().any(|p| p.contains("Mauve")));
            }
            other => panic!("expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_numeric_ranges() {
        let mut config = AppConfig::default();
        config.network.port = 0;
        config.smoothing.window = 0;
        config.warning.threshold_ms = 0;
        let err = config.validate().unwrap_err();
        let message = err.to_string();
        assert!(message.contains("network.port"));
        assert!(message.contains("smoothing.window"));
        assert!(message.contains("warning.threshold_ms"));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().expect("tempdir");
        let config = AppConfig::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.network.port, 2010);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("gaze.toml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "[recording]\nroot = \"/tmp/rec\"\n\n[warning]\nthreshold_ms = 1500").unwrap();

        let settings = AppConfig::load(Some(&path)).unwrap().validate().unwrap();
        assert_eq!(settings.recording.root, PathBuf::from("/tmp/rec"));
        assert_eq!(settings.warning.threshold, Duration::from_millis(1500));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let err = AppConfig::from_toml_str("[network\nport = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
