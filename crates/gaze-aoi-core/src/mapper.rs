//! Normalized gaze to screen pixels

use crate::types::{ScreenPoint, SmoothedPosition, Viewport};

/// Result of mapping one smoothed position onto the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedPoint {
    /// Clamped into the viewport; used for ray casting and the crosshair
    pub clamped: ScreenPoint,
    /// Same mapping without clamping; used for off-screen detection
    pub projected: ScreenPoint,
}

/// Map a smoothed position to pixels.
///
/// Device y grows upwards and pixel y grows downwards, so y is inverted
/// before scaling.
pub fn map_to_screen(position: SmoothedPosition, viewport: Viewport) -> MappedPoint {
    let x = position.x;
    let y = 1.0 - position.y;

    MappedPoint {
        clamped: ScreenPoint::new(
            clamp_unit(x) * viewport.width,
            clamp_unit(y) * viewport.height,
        ),
        projected: ScreenPoint::new(x * viewport.width, y * viewport.height),
    }
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        return 0.5;
    }
    value.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizedPosition;

    const HD: Viewport = Viewport {
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn test_center_maps_to_center() {
        let mapped = map_to_screen(NormalizedPosition::CENTER, HD);
        assert_eq!(mapped.clamped, ScreenPoint::new(960.0, 540.0));
        assert_eq!(mapped.projected, mapped.clamped);
    }

    #[test]
    fn test_y_is_inverted() {
        let mapped = map_to_screen(NormalizedPosition::new(0.0, 1.0), HD);
        assert_eq!(mapped.clamped, ScreenPoint::new(0.0, 0.0));

        let mapped = map_to_screen(NormalizedPosition::new(1.0, 0.25), HD);
        assert_eq!(mapped.clamped, ScreenPoint::new(1920.0, 810.0));
    }

    #[test]
    fn test_out_of_range_is_clamped_but_projection_is_not() {
        let mapped = map_to_screen(NormalizedPosition::new(1.5, -0.2), HD);
        assert_eq!(mapped.clamped, ScreenPoint::new(1920.0, 1080.0));
        assert!(mapped.projected.x > 1920.0);
        assert!(mapped.projected.y > 1080.0);
        assert!(!HD.contains(mapped.projected));
    }

    #[test]
    fn test_clamped_point_always_in_viewport() {
        let inputs = [-1e6, -3.7, -0.0001, 0.0, 0.3, 1.0, 1.0001, 42.0, 1e9];
        for &x in &inputs {
            for &y in &inputs {
                let mapped = map_to_screen(NormalizedPosition::new(x, y), HD);
                assert!(HD.contains(mapped.clamped), "({}, {}) -> {:?}", x, y, mapped);
            }
        }
    }
}
