//! Configuration for the gaze-aoi pipeline.
//!
//! The configuration is read from a TOML file into [`AppConfig`], a loosely
//! typed mirror of the file, and then validated once into [`Settings`]:
//!
//! - string fields go through explicit lookup tables into closed enums
//!   ([`HighlightMode`], [`SmoothingMode`], [`NamedColor`])
//! - numeric fields are range-checked
//! - every problem found is reported together in a single
//!   [`ConfigError::Invalid`]
//!
//! ```ignore
//! use gaze_aoi_config::AppConfig;
//!
//! let settings = AppConfig::load(Some(path))?.validate()?;
//! println!("listening on {}", settings.network.port);
//! ```

pub mod config;
pub mod error;
pub mod settings;
pub mod types;

pub use config::{
    AppConfig, DisplayConfig, HighlightConfig, NetworkConfig, RecordingConfig, SmoothingConfig,
    WarningConfig,
};
pub use error::{ConfigError, Result};
pub use settings::{
    DisplaySettings, HighlightSettings, NetworkSettings, RecordingSettings, Settings,
    SmoothingSettings, WarningSettings,
};
pub use types::{HighlightMode, NamedColor, Rgba, SmoothingMode};
