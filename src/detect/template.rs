//! Template matching against a fixed bank of arrow silhouettes.

use image::{GrayImage, Luma};

use super::gray::{crop, search_window};
use crate::trajectory::PixelPos;

/// Minimum normalized correlation for a match to count.
const MATCH_THRESHOLD: f64 = 0.5;

/// Template sizes in pixels. One light and one tonally inverted (dark)
/// silhouette is built per size, covering both cursor polarities.
const TEMPLATE_SIZES: [u32; 5] = [16, 20, 24, 28, 32];

/// Immutable bank of cursor silhouette templates.
///
/// Built once and shareable across concurrent pipelines.
pub struct TemplateBank {
    templates: Vec<GrayImage>,
}

impl TemplateBank {
    pub fn new() -> Self {
        let mut templates = Vec::with_capacity(TEMPLATE_SIZES.len() * 2);
        for size in TEMPLATE_SIZES {
            let arrow = arrow_silhouette(size);
            let inverted = GrayImage::from_fn(size, size, |x, y| {
                Luma([255 - arrow.get_pixel(x, y).0[0]])
            });
            templates.push(arrow);
            templates.push(inverted);
        }
        Self { templates }
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Find the cursor by normalized cross-correlation of every template.
    ///
    /// With a previous position the search is restricted to a square window
    /// of side `2 * search_radius` around it; otherwise the full frame is
    /// scanned. Only the single best match across all templates with score
    /// above the threshold is accepted, and the reported position is the
    /// template's center. Falls back to the previous position.
    pub fn find_cursor(
        &self,
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

        let mut best: Option<(f64, PixelPos)> = None;

        for template in &self.templates {
            if template.width() > region.width() || template.height() > region.height() {
                continue;
            }
            if let Some((score, loc)) = best_ncc_match(&region, template) {
                if score > MATCH_THRESHOLD && best.map_or(true, |(b, _)| score > b) {
                    let center = PixelPos::new(
                        loc.x + template.width() as i32 / 2 + offset.0,
                        loc.y + template.height() as i32 / 2 + offset.1,
                    );
                    best = Some((score, center));
                }
            }
        }

        best.map(|(_, pos)| pos).or(prev_position)
    }
}

impl Default for TemplateBank {
    fn default() -> Self {
        Self::new()
    }
}

/// Triangular arrow silhouette used by stock pointer cursors.
fn arrow_silhouette(size: u32) -> GrayImage {
    let s = size as f32;
    let points = [
        (0.0, 0.0),
        (0.0, 0.85 * s),
        (0.25 * s, 0.65 * s),
        (0.55 * s, 0.55 * s),
    ];

    // Even-odd scanline fill
    let mut img = GrayImage::new(size, size);
    for y in 0..size {
        let fy = y as f32 + 0.5;
        let mut crossings: Vec<f32> = Vec::new();
        for i in 0..points.len() {
            let (x0, y0) = points[i];
            let (x1, y1) = points[(i + 1) % points.len()];
            if (y0 <= fy && y1 > fy) || (y1 <= fy && y0 > fy) {
                crossings.push(x0 + (fy - y0) / (y1 - y0) * (x1 - x0));
            }
        }
        crossings.sort_by(|a, b| a.total_cmp(b));
        for pair in crossings.chunks_exact(2) {
            let start = pair[0].ceil().max(0.0) as u32;
            let end = (pair[1].floor() as i64).min(size as i64 - 1);
            for x in start as i64..=end {
                img.put_pixel(x as u32, y, Luma([255]));
            }
        }
    }
    img
}

/// Best zero-mean normalized cross-correlation placement of `template` in
/// `image`. Returns (score, top-left location), score in [-1, 1].
fn best_ncc_match(image: &GrayImage, template: &GrayImage) -> Option<(f64, PixelPos)> {
    let (iw, ih) = (image.width(), image.height());
    let (tw, th) = (template.width(), template.height());
    let n = (tw * th) as f64;

    // Template statistics are placement-invariant.
    let t_sum: f64 = template.pixels().map(|p| p.0[0] as f64).sum();
    let t_mean = t_sum / n;
    let t_var: f64 = template
        .pixels()
        .map(|p| {
            let d = p.0[0] as f64 - t_mean;
            d * d
        })
        .sum();
    if t_var <= f64::EPSILON {
        return None;
    }

    let mut best: Option<(f64, PixelPos)> = None;

    for oy in 0..=(ih - th) {
        for ox in 0..=(iw - tw) {
            let mut i_sum = 0.0;
            let mut i_sq_sum = 0.0;
            let mut cross = 0.0;
            for ty in 0..th {
                for tx in 0..tw {
                    let iv = image.get_pixel(ox + tx, oy + ty).0[0] as f64;
                    let tv = template.get_pixel(tx, ty).0[0] as f64;
                    i_sum += iv;
                    i_sq_sum += iv * iv;
                    cross += iv * tv;
                }
            }
            let i_mean = i_sum / n;
            let i_var = i_sq_sum - n * i_mean * i_mean;
            if i_var <= f64::EPSILON {
                continue;
            }
            let cov = cross - n * i_mean * t_mean;
            let score = cov / (i_var * t_var).sqrt();
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, PixelPos::new(ox as i32, oy as i32)));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_has_both_polarities_per_size() {
        let bank = TemplateBank::new();
        assert_eq!(bank.len(), 10);
    }

    #[test]
    fn test_silhouette_anchored_at_corner() {
        let arrow = arrow_silhouette(24);
        // Tip region is filled, opposite corner is not.
        assert!(arrow.get_pixel(1, 2).0[0] > 0);
        assert_eq!(arrow.get_pixel(22, 22).0[0], 0);
    }

    #[test]
    fn test_finds_planted_cursor() {
        // Paint an arrow silhouette into a mid-gray scene and expect the
        // bank to locate it.
        let mut scene = GrayImage::from_pixel(96, 96, Luma([128]));
        let arrow = arrow_silhouette(24);
        for y in 0..24 {
            for x in 0..24 {
                if arrow.get_pixel(x, y).0[0] > 0 {
                    scene.put_pixel(40 + x, 30 + y, Luma([255]));
                }
            }
        }

        let bank = TemplateBank::new();
        let found = bank.find_cursor(&scene, None, 300).expect("no match");
        // Center of the 24px template planted at (40, 30)
        assert!((found.x - 52).abs() <= 2, "x = {}", found.x);
        assert!((found.y - 42).abs() <= 2, "y = {}", found.y);
    }

    #[test]
    fn test_featureless_frame_returns_previous() {
        let scene = GrayImage::from_pixel(64, 64, Luma([128]));
        let bank = TemplateBank::new();
        let prev = Some(PixelPos::new(10, 10));
        assert_eq!(bank.find_cursor(&scene, prev, 100), prev);
        assert_eq!(bank.find_cursor(&scene, None, 100), None);
    }

    #[test]
    fn test_search_window_restricts_scan() {
        let mut scene = GrayImage::from_pixel(200, 200, Luma([128]));
        let arrow = arrow_silhouette(24);
        for y in 0..24 {
            for x in 0..24 {
                if arrow.get_pixel(x, y).0[0] > 0 {
                    scene.put_pixel(150 + x, 150 + y, Luma([255]));
                }
            }
        }

        let bank = TemplateBank::new();
        // Cursor far outside the window around (20, 20): not found.
        let prev = Some(PixelPos::new(20, 20));
        assert_eq!(bank.find_cursor(&scene, prev, 50), prev);
        // Window around the cursor: found.
        let near = bank.find_cursor(&scene, Some(PixelPos::new(160, 160)), 50);
        assert!(near.unwrap().distance_to(PixelPos::new(162, 162)) < 5.0);
    }
}
