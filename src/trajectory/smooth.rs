//! Bidirectional exponential smoothing for cursor trajectories.

use super::Waypoint;

/// Smooth a trajectory with a bidirectional exponential moving average.
///
/// The forward pass applies `s[i] = alpha * p[i] + (1 - alpha) * s[i-1]`;
/// the backward pass then overwrites from the second-to-last element down
/// with `s[i] = alpha * s[i] + (1 - alpha) * s[i+1]`. Running both passes
/// cancels the causal lag a single EMA introduces, at the cost of needing
/// the full sequence in memory (at most one sample per frame, so fine).
///
/// Only spatial coordinates are smoothed; times pass through untouched.
/// Sequences shorter than 2 points are returned unchanged.
///
/// Alpha 0.35 suits dense interactive traces; 0.5 suits noisier detected
/// traces.
pub fn smooth_waypoints(points: &[Waypoint], alpha: f64) -> Vec<Waypoint> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let mut smoothed = Vec::with_capacity(points.len());
    smoothed.push(points[0]);

    // Forward pass
    for curr in &points[1..] {
        let prev = *smoothed.last().unwrap_or(&points[0]);
        smoothed.push(Waypoint {
            x: alpha * curr.x + (1.0 - alpha) * prev.x,
            y: alpha * curr.y + (1.0 - alpha) * prev.y,
            time: curr.time,
        });
    }

    // Backward pass
    for i in (0..smoothed.len() - 1).rev() {
        let next = smoothed[i + 1];
        smoothed[i].x = alpha * smoothed[i].x + (1.0 - alpha) * next.x;
        smoothed[i].y = alpha * smoothed[i].y + (1.0 - alpha) * next.y;
    }

    smoothed
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wp(x: f64, y: f64, time: f64) -> Waypoint {
        Waypoint { x, y, time }
    }

    #[test]
    fn test_constant_sequence_unchanged() {
        let points: Vec<_> = (0..10).map(|i| wp(0.4, 0.6, i as f64 * 0.1)).collect();
        let smoothed = smooth_waypoints(&points, 0.35);
        for (orig, out) in points.iter().zip(&smoothed) {
            assert!((out.x - orig.x).abs() < 1e-9);
            assert!((out.y - orig.y).abs() < 1e-9);
            assert_eq!(out.time, orig.time);
        }
    }

    #[test]
    fn test_short_sequences_pass_through() {
        assert!(smooth_waypoints(&[], 0.35).is_empty());
        let one = vec![wp(0.1, 0.9, 0.0)];
        assert_eq!(smooth_waypoints(&one, 0.35), one);
    }

    #[test]
    fn test_times_pass_through() {
        let points = vec![wp(0.0, 0.0, 0.0), wp(1.0, 1.0, 0.5), wp(0.0, 0.0, 1.25)];
        let smoothed = smooth_waypoints(&points, 0.5);
        let times: Vec<_> = smoothed.iter().map(|p| p.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.25]);
    }

    #[test]
    fn test_smoothing_reduces_jitter() {
        // Alternating jitter around 0.5 should contract toward 0.5.
        let points: Vec<_> = (0..20)
            .map(|i| {
                let jitter = if i % 2 == 0 { 0.1 } else { -0.1 };
                wp(0.5 + jitter, 0.5 - jitter, i as f64 / 30.0)
            })
            .collect();
        let smoothed = smooth_waypoints(&points, 0.35);

        let spread = |pts: &[Waypoint]| {
            pts.iter()
                .map(|p| (p.x - 0.5).abs())
                .fold(0.0f64, f64::max)
        };
        assert!(spread(&smoothed) < spread(&points));
    }

    #[test]
    fn test_first_point_anchors_forward_pass() {
        let points = vec![wp(0.0, 0.0, 0.0), wp(1.0, 1.0, 1.0)];
        let smoothed = smooth_waypoints(&points, 0.5);
        // Forward: s1 = 0.5; backward: s0 = 0.5*0 + 0.5*0.5 = 0.25
        assert!((smoothed[0].x - 0.25).abs() < 1e-9);
        assert!((smoothed[1].x - 0.5).abs() < 1e-9);
    }
}
