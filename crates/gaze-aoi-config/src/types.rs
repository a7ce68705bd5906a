//! Closed enumerations that configuration strings map onto.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy controlling which resolved objects receive a highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HighlightMode {
    /// Nothing is highlighted and existing highlights are left alone.
    #[default]
    None,
    /// Only objects belonging to a registered vehicle; the whole vehicle lights up.
    MatchingCategoryOnly,
    /// Whatever object the gaze ray hits.
    All,
}

impl HighlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::MatchingCategoryOnly => "MatchingCategoryOnly",
            Self::All => "All",
        }
    }

    /// Look up a mode by its configuration name.
    ///
    /// `VehiclesOnly` is accepted as the older name of `MatchingCategoryOnly`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "None" => Some(Self::None),
            "MatchingCategoryOnly" | "VehiclesOnly" => Some(Self::MatchingCategoryOnly),
            "All" => Some(Self::All),
            _ => None,
        }
    }
}

impl fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How raw gaze positions are smoothed across updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SmoothingMode {
    /// `smoothed += alpha * (raw - smoothed)`
    #[default]
    Exponential,
    /// Mean of the most recent `window` raw positions.
    MovingAverage,
}

impl SmoothingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exponential => "exponential",
            Self::MovingAverage => "moving_average",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "exponential" => Some(Self::Exponential),
            "moving_average" | "moving-average" => Some(Self::MovingAverage),
            _ => None,
        }
    }
}

impl fmt::Display for SmoothingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// RGBA colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

/// Named colours available to the crosshair, gaze marker and highlight glow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    White,
    DarkGray,
    Gray,
    LightGray,
    Red,
    Green,
    Blue,
    Yellow,
    Magenta,
    Cyan,
    Orange,
    Brown,
    Pink,
}

const COLOR_TABLE: &[(&str, NamedColor, Rgba)] = &[
    ("black", NamedColor::Black, Rgba::new(0.0, 0.0, 0.0, 1.0)),
    ("white", NamedColor::White, Rgba::new(1.0, 1.0, 1.0, 1.0)),
    ("darkgray", NamedColor::DarkGray, Rgba::new(0.2, 0.2, 0.2, 1.0)),
    ("gray", NamedColor::Gray, Rgba::new(0.5, 0.5, 0.5, 1.0)),
    ("lightgray", NamedColor::LightGray, Rgba::new(0.8, 0.8, 0.8, 1.0)),
    ("red", NamedColor::Red, Rgba::new(1.0, 0.0, 0.0, 1.0)),
    ("green", NamedColor::Green, Rgba::new(0.0, 1.0, 0.0, 1.0)),
    ("blue", NamedColor::Blue, Rgba::new(0.0, 0.0, 1.0, 1.0)),
    ("yellow", NamedColor::Yellow, Rgba::new(1.0, 1.0, 0.0, 1.0)),
    ("magenta", NamedColor::Magenta, Rgba::new(1.0, 0.0, 1.0, 1.0)),
    ("cyan", NamedColor::Cyan, Rgba::new(0.0, 1.0, 1.0, 1.0)),
    ("orange", NamedColor::Orange, Rgba::new(251.0 / 255.0, 130.0 / 255.0, 0.0, 1.0)),
    ("brown", NamedColor::Brown, Rgba::new(65.0 / 255.0, 40.0 / 255.0, 25.0 / 255.0, 1.0)),
    ("pink", NamedColor::Pink, Rgba::new(1.0, 0.68, 0.68, 1.0)),
];

impl NamedColor {
    /// Case-insensitive lookup in the colour table.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = name.trim().to_ascii_lowercase();
        COLOR_TABLE
            .iter()
            .find(|(n, _, _)| *n == key)
            .map(|(_, color, _)| *color)
    }

    pub fn rgba(&self) -> Rgba {
        COLOR_TABLE
            .iter()
            .find(|(_, color, _)| color == self)
            .map(|(_, _, rgba)| *rgba)
            .unwrap_or(Rgba::new(0.0, 0.0, 0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_mode_names() {
        assert_eq!(HighlightMode::from_name("All"), Some(HighlightMode::All));
        assert_eq!(
            HighlightMode::from_name("VehiclesOnly"),
            Some(HighlightMode::MatchingCategoryOnly)
        );
        assert_eq!(HighlightMode::from_name("all"), None);
        assert_eq!(HighlightMode::from_name("Everything"), None);
    }

    #[test]
    fn test_smoothing_mode_names() {
        assert_eq!(
            SmoothingMode::from_name("Moving_Average"),
            Some(SmoothingMode::MovingAverage)
        );
        assert_eq!(SmoothingMode::from_name("kalman"), None);
    }

    #[test]
    fn test_color_lookup_is_case_insensitive() {
        assert_eq!(NamedColor::from_name("ORANGE"), Some(NamedColor::Orange));
        assert_eq!(NamedColor::from_name("lightGray"), Some(NamedColor::LightGray));
        assert_eq!(NamedColor::from_name("chartreuse"), None);
    }

    #[test]
    fn test_every_color_has_rgba() {
        for (_, color, rgba) in COLOR_TABLE {
            assert_eq!(color.rgba(), *rgba);
        }
        assert_eq!(NamedColor::Red.rgba(), Rgba::new(1.0, 0.0, 0.0, 1.0));
    }
}
