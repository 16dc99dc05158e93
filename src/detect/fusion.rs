//! Fusion arbiter resolving the detector outputs into one accepted position.
//!
//! The independent detectors fail differently: template matching on custom
//! cursor skins, motion when the cursor is stationary, edges on cluttered
//! backgrounds. Continuity-based outlier rejection keeps the track from
//! flickering between them.

use crate::trajectory::PixelPos;

/// Which estimator produced a candidate. Variant order is the evaluation
/// order: template is most reliable cold, motion most reliable live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorKind {
    Template,
    Motion,
    Edge,
}

/// A per-frame position estimate from one detector.
#[derive(Debug, Clone, Copy)]
pub struct DetectionCandidate {
    pub method: DetectorKind,
    pub pos: PixelPos,
}

/// Resolve detector candidates plus continuity into one accepted position.
///
/// 1. A motion candidate equal to the previous position is discarded as
///    non-informative.
/// 2. With a previous position, candidates farther than `search_radius`
///    from it are outliers; among survivors a template candidate wins,
///    else the nearest survivor. No survivors: previous position unchanged.
/// 3. Cold start: a template candidate wins, else the first candidate in
///    evaluation order.
/// 4. No candidates at all: previous position or absence.
pub fn fuse_candidates(
    candidates: &[DetectionCandidate],
    prev_position: Option<PixelPos>,
    search_radius: i32,
) -> Option<PixelPos> {
    let informative: Vec<DetectionCandidate> = candidates
        .iter()
        .filter(|c| !(c.method == DetectorKind::Motion && Some(c.pos) == prev_position))
        .copied()
        .collect();

    if informative.is_empty() {
        return prev_position;
    }

    if let Some(prev) = prev_position {
        let survivors: Vec<DetectionCandidate> = informative
            .iter()
            .filter(|c| c.pos.distance_to(prev) < search_radius as f64)
            .copied()
            .collect();

        if survivors.is_empty() {
            return Some(prev);
        }

        if let Some(t) = survivors.iter().find(|c| c.method == DetectorKind::Template) {
            return Some(t.pos);
        }

        return survivors
            .iter()
            .min_by(|a, b| {
                a.pos
                    .distance_to(prev)
                    .total_cmp(&b.pos.distance_to(prev))
            })
            .map(|c| c.pos);
    }

    // Cold start
    informative
        .iter()
        .find(|c| c.method == DetectorKind::Template)
        .or_else(|| informative.first())
        .map(|c| c.pos)
}
