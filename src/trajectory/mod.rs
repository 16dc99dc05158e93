//! Cursor trajectory types and validation.
//!
//! A trajectory is an ordered sequence of [`Waypoint`]s spanning a video's
//! duration. Waypoints arrive over the wire as normalized `{x, y, time}`
//! samples and are validated once, before any per-frame work.

mod interpolate;
mod smooth;

pub use interpolate::position_at_time;
pub use smooth::smooth_waypoints;

use serde::{Deserialize, Serialize};

use crate::error::{CursorFlowError, CursorFlowResult};

/// A timestamped, normalized cursor sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Horizontal position, normalized to [0, 1].
    pub x: f64,
    /// Vertical position, normalized to [0, 1].
    pub y: f64,
    /// Time in seconds from the start of the video.
    pub time: f64,
}

/// An integer pixel position inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPos {
    pub x: i32,
    pub y: i32,
}

impl PixelPos {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(self, other: PixelPos) -> f64 {
        let dx = (self.x - other.x) as f64;
        let dy = (self.y - other.y) as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Validate a caller-supplied trajectory before any per-frame work.
///
/// Coordinates must be finite and in [0, 1]; times must be finite and
/// non-decreasing. Duplicate times are allowed (the interpolator handles
/// that degenerate case explicitly). An empty trajectory is valid: the
/// interpolator falls back to the canvas center.
pub fn validate_waypoints(waypoints: &[Waypoint]) -> CursorFlowResult<()> {
    for (i, wp) in waypoints.iter().enumerate() {
        if !wp.x.is_finite() || !wp.y.is_finite() || !wp.time.is_finite() {
            return Err(CursorFlowError::MalformedWaypoints(format!(
                "non-finite value at index {}",
                i
            )));
        }
        if !(0.0..=1.0).contains(&wp.x) || !(0.0..=1.0).contains(&wp.y) {
            return Err(CursorFlowError::MalformedWaypoints(format!(
                "coordinates out of [0,1] at index {}: ({}, {})",
                i, wp.x, wp.y
            )));
        }
        if i > 0 && wp.time < waypoints[i - 1].time {
            return Err(CursorFlowError::MalformedWaypoints(format!(
                "time decreases at index {}: {} < {}",
                i,
                wp.time,
                waypoints[i - 1].time
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(x: f64, y: f64, time: f64) -> Waypoint {
        Waypoint { x, y, time }
    }

    #[test]
    fn test_waypoint_wire_shape() {
        let json = r#"[{"x":0.25,"y":0.75,"time":1.5}]"#;
        let points: Vec<Waypoint> = serde_json::from_str(json).unwrap();
        assert_eq!(points[0], wp(0.25, 0.75, 1.5));
        assert_eq!(serde_json::to_string(&points).unwrap(), json);
    }

    #[test]
    fn test_validate_accepts_ordered() {
        let points = vec![wp(0.0, 0.0, 0.0), wp(0.5, 0.5, 1.0), wp(1.0, 1.0, 2.0)];
        assert!(validate_waypoints(&points).is_ok());
        assert!(validate_waypoints(&[]).is_ok());
    }

    #[test]
    fn test_validate_accepts_duplicate_times() {
        let points = vec![wp(0.0, 0.0, 1.0), wp(0.5, 0.5, 1.0)];
        assert!(validate_waypoints(&points).is_ok());
    }

    #[test]
    fn test_validate_rejects_descending_times() {
        let points = vec![wp(0.0, 0.0, 2.0), wp(0.5, 0.5, 1.0)];
        let err = validate_waypoints(&points).unwrap_err();
        assert!(matches!(err, CursorFlowError::MalformedWaypoints(_)));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let points = vec![wp(1.5, 0.0, 0.0)];
        assert!(validate_waypoints(&points).is_err());
        let points = vec![wp(0.5, f64::NAN, 0.0)];
        assert!(validate_waypoints(&points).is_err());
    }

    #[test]
    fn test_pixel_distance() {
        let a = PixelPos::new(0, 0);
        let b = PixelPos::new(3, 4);
        assert_eq!(a.distance_to(b), 5.0);
    }
}
