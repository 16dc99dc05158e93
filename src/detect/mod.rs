//! Cursor detection for videos without ground-truth coordinates.
//!
//! Three independent weak estimators (template, motion, edge) run per
//! frame; the fusion arbiter resolves their outputs plus continuity into
//! one accepted position. Each estimator is non-failing: on inability to
//! find a cursor it reports the carried-over previous position or absence.

mod contour;
mod edge;
mod fusion;
mod gray;
mod motion;
mod template;

pub use fusion::{fuse_candidates, DetectionCandidate, DetectorKind};
pub use gray::rgb_to_gray;
pub use template::TemplateBank;

use image::GrayImage;

use crate::trajectory::PixelPos;

/// Default search radius around the previous position, in pixels.
pub const DEFAULT_SEARCH_RADIUS: i32 = 300;

/// The detector bank: an immutable template set plus tuning.
///
/// Holds no mutable state; one bank may be built once and shared across
/// concurrent pipeline instances.
pub struct DetectorBank {
    templates: TemplateBank,
    search_radius: i32,
}

impl DetectorBank {
    pub fn new() -> Self {
        Self::with_search_radius(DEFAULT_SEARCH_RADIUS)
    }

    pub fn with_search_radius(search_radius: i32) -> Self {
        Self {
            templates: TemplateBank::new(),
            search_radius,
        }
    }

    pub fn search_radius(&self) -> i32 {
        self.search_radius
    }

    /// Run all three estimators on a frame and fuse their candidates.
    ///
    /// `prev_frame` is the immediately preceding grayscale frame (absent on
    /// the first frame), `prev_position` the last accepted position.
    pub fn detect(
        &self,
        frame: &GrayImage,
        prev_frame: Option<&GrayImage>,
        prev_position: Option<PixelPos>,
    ) -> Option<PixelPos> {
        let mut candidates: Vec<DetectionCandidate> = Vec::with_capacity(3);

        if let Some(pos) = self
            .templates
            .find_cursor(frame, prev_position, self.search_radius)
        {
            candidates.push(DetectionCandidate {
                method: DetectorKind::Template,
                pos,
            });
        }

        if let Some(pos) =
            motion::find_cursor_by_motion(prev_frame, frame, prev_position, self.search_radius)
        {
            candidates.push(DetectionCandidate {
                method: DetectorKind::Motion,
                pos,
            });
        }

        if let Some(pos) = edge::find_cursor_by_edge(frame, prev_position, self.search_radius) {
            candidates.push(DetectionCandidate {
                method: DetectorKind::Edge,
                pos,
            });
        }

        fuse_candidates(&candidates, prev_position, self.search_radius)
    }
}

impl Default for DetectorBank {
    fn default() -> Self {
        Self::new()
    }
}
