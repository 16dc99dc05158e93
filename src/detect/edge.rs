//! Edge-based cursor detection.
//!
//! Finds the cursor's characteristic edge outline in the search window and
//! keeps compact, roughly cursor-shaped components.

use image::GrayImage;

use super::contour::{find_regions, Region};
use super::gray::{crop, dilate, edge_map, search_window};
use crate::trajectory::PixelPos;

/// Hysteresis thresholds for the edge map.
const EDGE_LOW: u16 = 50;
const EDGE_HIGH: u16 = 150;

/// Accepted component area range in px².
const MIN_AREA: u32 = 50;
const MAX_AREA: u32 = 3_000;

/// Accepted bounding-box aspect ratio range.
const MIN_ASPECT: f64 = 0.5;
const MAX_ASPECT: f64 = 3.0;

/// Detect the cursor from its edge outline.
///
/// Runs edge detection on the search window, dilates once to close the
/// outline, then keeps components in the cursor-plausible area and aspect
/// range. Tie-break: nearest centroid to the previous position if there is
/// one, else largest area. Falls back to the previous position.
pub fn find_cursor_by_edge(
    gray: &GrayImage,
    prev_position: Option<PixelPos>,
    search_radius: i32,
) -> Option<PixelPos> {
    let (region, offset) = match prev_position {
        Some(p) => {
            let (x1, y1, x2, y2) =
                search_window((p.x, p.y), search_radius, gray.width(), gray.height());
            if x2 <= x1 || y2 <= y1 {
                return prev_position;
            }
            (crop(gray, x1, y1, x2, y2), (x1 as i32, y1 as i32))
        },
        None => (gray.clone(), (0, 0)),
    };

    let edges = dilate(&edge_map(&region, EDGE_LOW, EDGE_HIGH), 1);

    let valid: Vec<Region> = find_regions(&edges)
        .into_iter()
        .filter(|r| {
            let aspect = r.aspect_ratio();
            r.area > MIN_AREA && r.area < MAX_AREA && aspect > MIN_ASPECT && aspect < MAX_ASPECT
        })
        .collect();

    if valid.is_empty() {
        return prev_position;
    }

    let chosen = match prev_position {
        Some(prev) => valid
            .iter()
            .min_by(|a, b| {
                let da = centroid_distance(a, offset, prev);
                let db = centroid_distance(b, offset, prev);
                da.total_cmp(&db)
            })
            .copied(),
        None => valid.iter().max_by_key(|r| r.area).copied(),
    };

    chosen
        .and_then(|r| r.centroid())
        .map(|c| PixelPos::new(c.x + offset.0, c.y + offset.1))
        .or(prev_position)
}

fn centroid_distance(region: &Region, offset: (i32, i32), prev: PixelPos) -> f64 {
    match region.centroid() {
        Some(c) => PixelPos::new(c.x + offset.0, c.y + offset.1).distance_to(prev),
        None => f64::INFINITY,
    }
}
