//! Validated settings produced by [`crate::AppConfig::validate`].

use std::path::PathBuf;
use std::time::Duration;

use crate::types::{HighlightMode, NamedColor, SmoothingMode};

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub network: NetworkSettings,
    pub smoothing: SmoothingSettings,
    pub highlight: HighlightSettings,
    pub warning: WarningSettings,
    pub display: DisplaySettings,
    pub recording: RecordingSettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkSettings {
    pub port: u16,
    pub packet_size: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SmoothingSettings {
    pub mode: SmoothingMode,
    pub alpha: f64,
    pub window: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSettings {
    pub mode: HighlightMode,
    pub color: NamedColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WarningSettings {
    pub show: bool,
    /// Continuous off-screen time after which the warning activates
    pub threshold: Duration,
    /// Flash cadence of the warning frame (presentation only)
    pub flashing_interval: Duration,
}

/// Presentation flags, passed through to whoever draws the markers.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub show_crosshairs: bool,
    pub crosshair_color: NamedColor,
    pub crosshair_scale: f32,
    pub show_gaze_sphere: bool,
    pub sphere_color: NamedColor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSettings {
    pub enabled: bool,
    pub root: PathBuf,
}
