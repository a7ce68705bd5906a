//! Per-surface smoothing of raw gaze positions across updates

use std::collections::{HashMap, VecDeque};

use gaze_aoi_config::{SmoothingMode, SmoothingSettings};

use crate::types::{NormalizedPosition, SmoothedPosition};

#[derive(Debug, Clone)]
enum SurfaceState {
    Exponential(SmoothedPosition),
    Window(VecDeque<NormalizedPosition>),
}

/// Smoothing state for every surface seen so far.
///
/// Exponential mode starts each surface at the screen center and moves it by
/// `alpha` of the difference on each update. The x and y axes are updated
/// independently, each against its own raw coordinate.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    mode: SmoothingMode,
    alpha: f64,
    window: usize,
    surfaces: HashMap<String, SurfaceState>,
}

impl SmoothingFilter {
    pub fn new(settings: &SmoothingSettings) -> Self {
        Self {
            mode: settings.mode,
            alpha: settings.alpha,
            window: settings.window.max(1),
            surfaces: HashMap::new(),
        }
    }

    /// Exponential filter with the given coefficient
    pub fn exponential(alpha: f64) -> Self {
        Self::new(&SmoothingSettings {
            mode: SmoothingMode::Exponential,
            alpha,
            window: 1,
        })
    }

    /// Fold `raw` into the surface's state and return the new smoothed position
    pub fn apply(&mut self, surface: &str, raw: NormalizedPosition) -> SmoothedPosition {
        let alpha = self.alpha;
        let window = self.window;
        let mode = self.mode;

        let state = self
            .surfaces
            .entry(surface.to_string())
            .or_insert_with(|| match mode {
                SmoothingMode::Exponential => SurfaceState::Exponential(NormalizedPosition::CENTER),
                SmoothingMode::MovingAverage => SurfaceState::Window(VecDeque::with_capacity(window)),
            });

        match state {
            SurfaceState::Exponential(smoothed) => {
                let next = NormalizedPosition::new(
                    smoothed.x + alpha * (raw.x - smoothed.x),
                    smoothed.y + alpha * (raw.y - smoothed.y),
                );
                // A non-finite state would never recover
                if next.is_finite() {
                    *smoothed = next;
                }
                *smoothed
            }
            SurfaceState::Window(history) => {
                if raw.is_finite() {
                    history.push_back(raw);
                }
                while history.len() > window {
                    history.pop_front();
                }
                mean(history).unwrap_or(NormalizedPosition::CENTER)
            }
        }
    }

    /// Current smoothed position of `surface`, if it has been observed
    pub fn current(&self, surface: &str) -> Option<SmoothedPosition> {
        self.surfaces.get(surface).and_then(|state| match state {
            SurfaceState::Exponential(p) => Some(*p),
            SurfaceState::Window(history) => mean(history),
        })
    }
}

fn mean(history: &VecDeque<NormalizedPosition>) -> Option<NormalizedPosition> {
    if history.is_empty() {
        return None;
    }
    let n = history.len() as f64;
    let (sx, sy) = history
        .iter()
        .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
    Some(NormalizedPosition::new(sx / n, sy / n))
}
