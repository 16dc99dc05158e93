//! Motion-based cursor detection from consecutive frame differences.

use image::GrayImage;

use super::contour::{find_regions, Region};
use super::gray::{absdiff, dilate, erode, threshold};
use crate::trajectory::PixelPos;

/// Pixel-difference threshold separating motion from sensor noise.
const DIFF_THRESHOLD: u8 = 15;

/// Accepted component area range in px² (cursor-sized blobs).
const MIN_AREA: u32 = 30;
const MAX_AREA: u32 = 10_000;

/// Detect the cursor as the moving blob between two consecutive frames.
///
/// Requires both frames; with no previous frame there is nothing to
/// difference and the result is absence. The difference is thresholded,
/// dilated twice and eroded once to suppress noise while keeping
/// cursor-sized blobs. With a previous position only components within
/// `search_radius` are considered and the nearest wins; if none are near
/// the previous position is returned unchanged (a stationary cursor
/// produces no difference). Without one, the largest component wins.
pub fn find_cursor_by_motion(
    prev_frame: Option<&GrayImage>,
    curr_frame: &GrayImage,
    prev_position: Option<PixelPos>,
    search_radius: i32,
) -> Option<PixelPos> {
    let prev_frame = prev_frame?;

    let diff = absdiff(prev_frame, curr_frame);
    let mut mask = threshold(&diff, DIFF_THRESHOLD);
    mask = dilate(&mask, 2);
    mask = dilate(&mask, 2);
    mask = erode(&mask, 2);

    let regions: Vec<Region> = find_regions(&mask)
        .into_iter()
        .filter(|r| r.area > MIN_AREA && r.area < MAX_AREA)
        .collect();

    if regions.is_empty() {
        return prev_position;
    }

    let chosen = match prev_position {
        Some(prev) => {
            let mut nearby: Vec<(f64, &Region)> = regions
                .iter()
                .filter_map(|r| {
                    let c = r.centroid()?;
                    let d = c.distance_to(prev);
                    (d < search_radius as f64).then_some((d, r))
                })
                .collect();
            if nearby.is_empty() {
                // Stationary: no motion near the cursor.
                return prev_position;
            }
            nearby.sort_by(|a, b| a.0.total_cmp(&b.0));
            *nearby[0].1
        },
        None => *regions.iter().max_by_key(|r| r.area)?,
    };

    chosen.centroid().or(prev_position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn flat(v: u8) -> GrayImage {
        GrayImage::from_pixel(120, 120, Luma([v]))
    }

    fn with_block(mut img: GrayImage, x1: u32, y1: u32, side: u32, v: u8) -> GrayImage {
        for y in y1..y1 + side {
            for x in x1..x1 + side {
                img.put_pixel(x, y, Luma([v]));
            }
        }
        img
    }

    #[test]
    fn test_identical_frames_return_previous() {
        let a = flat(100);
        let b = flat(100);
        let prev = Some(PixelPos::new(30, 30));
        assert_eq!(find_cursor_by_motion(Some(&a), &b, prev, 300), prev);
        assert_eq!(find_cursor_by_motion(Some(&a), &b, None, 300), None);
    }

    #[test]
    fn test_no_previous_frame_is_absence() {
        let b = flat(100);
        assert_eq!(
            find_cursor_by_motion(None, &b, Some(PixelPos::new(5, 5)), 300),
            None
        );
    }

    #[test]
    fn test_moving_blob_found() {
        let a = flat(100);
        let b = with_block(flat(100), 50, 60, 10, 200);
        let pos = find_cursor_by_motion(Some(&a), &b, None, 300).expect("no blob");
        assert!(pos.distance_to(PixelPos::new(54, 64)) < 4.0, "{:?}", pos);
    }

    #[test]
    fn test_nearest_blob_preferred_with_previous() {
        let a = flat(100);
        let mut b = with_block(flat(100), 10, 10, 10, 200);
        b = with_block(b, 90, 90, 14, 200);
        let prev = Some(PixelPos::new(16, 16));
        let pos = find_cursor_by_motion(Some(&a), &b, prev, 300).expect("no blob");
        // Nearest to prev, even though the other blob is larger.
        assert!(pos.distance_to(PixelPos::new(14, 14)) < 4.0, "{:?}", pos);
    }

    #[test]
    fn test_distant_motion_is_stationary() {
        let a = flat(100);
        let b = with_block(flat(100), 100, 100, 10, 200);
        let prev = Some(PixelPos::new(5, 5));
        // Only motion is outside the search radius
        assert_eq!(find_cursor_by_motion(Some(&a), &b, prev, 50), prev);
    }
}
