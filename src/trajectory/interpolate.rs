//! Maps a continuous query time onto a denormalized pixel position.

use super::{PixelPos, Waypoint};

/// Interpolate the cursor position at time `t` over an ascending trajectory,
/// denormalized to a `width` x `height` canvas.
///
/// An empty trajectory yields the canvas center. Queries before the first
/// waypoint clamp to it, queries past the last clamp to that; two waypoints
/// sharing a timestamp resolve to one of them rather than dividing by zero.
/// Coordinates are truncated to integer pixels.
pub fn position_at_time(points: &[Waypoint], t: f64, width: u32, height: u32) -> PixelPos {
    if points.is_empty() {
        return PixelPos::new(width as i32 / 2, height as i32 / 2);
    }

    // Find the first waypoint strictly after t; prev is the one before it.
    let mut prev = points[0];
    let mut next = points[points.len() - 1];

    for (i, point) in points.iter().enumerate() {
        if point.time > t {
            next = *point;
            if i > 0 {
                prev = points[i - 1];
            }
            break;
        }
        prev = *point;
    }

    let (x, y) = if prev.time == next.time {
        (prev.x * width as f64, prev.y * height as f64)
    } else {
        let ratio = ((t - prev.time) / (next.time - prev.time)).clamp(0.0, 1.0);
        (
            (prev.x + ratio * (next.x - prev.x)) * width as f64,
            (prev.y + ratio * (next.y - prev.y)) * height as f64,
        )
    };

    PixelPos::new(x as i32, y as i32)
}
