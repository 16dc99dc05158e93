//! Grayscale raster operations backing the detectors.
//!
//! Binary images are 0/255 `GrayImage`s; morphology treats any nonzero
//! pixel as set.

use image::{GrayImage, Luma, RgbImage};

/// Convert an RGB frame to grayscale (Rec. 601 luma).
pub fn rgb_to_gray(frame: &RgbImage) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let p = frame.get_pixel(x, y).0;
        let luma = 0.299 * p[0] as f32 + 0.587 * p[1] as f32 + 0.114 * p[2] as f32;
        Luma([luma.round().min(255.0) as u8])
    })
}

/// Unsigned per-pixel difference. Panics in debug if dimensions differ;
/// callers always pass consecutive frames of one video.
pub fn absdiff(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    GrayImage::from_fn(a.width(), a.height(), |x, y| {
        let va = a.get_pixel(x, y).0[0];
        let vb = b.get_pixel(x, y).0[0];
        Luma([va.abs_diff(vb)])
    })
}

/// Binary threshold: 255 where the pixel exceeds `t`, else 0.
pub fn threshold(img: &GrayImage, t: u8) -> GrayImage {
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        Luma([if img.get_pixel(x, y).0[0] > t { 255 } else { 0 }])
    })
}

/// Binary dilation with a square kernel of the given radius.
pub fn dilate(img: &GrayImage, radius: i32) -> GrayImage {
    morph(img, radius, true)
}

/// Binary erosion with a square kernel of the given radius.
pub fn erode(img: &GrayImage, radius: i32) -> GrayImage {
    morph(img, radius, false)
}

fn morph(img: &GrayImage, radius: i32, max: bool) -> GrayImage {
    let (w, h) = (img.width() as i32, img.height() as i32);
    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let (x, y) = (x as i32, y as i32);
        let mut hit = !max;
        'scan: for ky in (y - radius).max(0)..=(y + radius).min(h - 1) {
            for kx in (x - radius).max(0)..=(x + radius).min(w - 1) {
                let set = img.get_pixel(kx as u32, ky as u32).0[0] > 0;
                if set == max {
                    hit = max;
                    break 'scan;
                }
            }
        }
        Luma([if hit { 255 } else { 0 }])
    })
}

/// Crop a rectangular window. Coordinates are clamped by the caller.
pub fn crop(img: &GrayImage, x1: u32, y1: u32, x2: u32, y2: u32) -> GrayImage {
    GrayImage::from_fn(x2 - x1, y2 - y1, |x, y| *img.get_pixel(x1 + x, y1 + y))
}

/// Clamp a square search window of the given radius around a center point.
/// Returns (x1, y1, x2, y2) in image coordinates.
pub fn search_window(
    center: (i32, i32),
    radius: i32,
    width: u32,
    height: u32,
) -> (u32, u32, u32, u32) {
    let (cx, cy) = center;
    let x1 = (cx - radius).clamp(0, width as i32) as u32;
    let y1 = (cy - radius).clamp(0, height as i32) as u32;
    let x2 = (cx + radius).clamp(0, width as i32) as u32;
    let y2 = (cy + radius).clamp(0, height as i32) as u32;
    (x1, y1, x2, y2)
}

/// Edge map with gradient magnitude and double-threshold hysteresis:
/// pixels above `high` are edges, pixels above `low` survive only when
/// connected to one.
pub fn edge_map(img: &GrayImage, low: u16, high: u16) -> GrayImage {
    let (w, h) = (img.width() as i32, img.height() as i32);
    if w < 3 || h < 3 {
        return GrayImage::new(img.width(), img.height());
    }

    let px = |x: i32, y: i32| img.get_pixel(x as u32, y as u32).0[0] as i32;

    // Sobel gradient magnitude
    let mut mag = vec![0u16; (w * h) as usize];
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let gx = -px(x - 1, y - 1) - 2 * px(x - 1, y) - px(x - 1, y + 1)
                + px(x + 1, y - 1)
                + 2 * px(x + 1, y)
                + px(x + 1, y + 1);
            let gy = -px(x - 1, y - 1) - 2 * px(x, y - 1) - px(x + 1, y - 1)
                + px(x - 1, y + 1)
                + 2 * px(x, y + 1)
                + px(x + 1, y + 1);
            let m = ((gx * gx + gy * gy) as f64).sqrt();
            mag[(y * w + x) as usize] = m.min(u16::MAX as f64) as u16;
        }
    }

    // Hysteresis: flood weak pixels reachable from strong ones.
    let mut out = vec![0u8; (w * h) as usize];
    let mut stack = Vec::new();
    for i in 0..mag.len() {
        if mag[i] >= high && out[i] == 0 {
            out[i] = 255;
            stack.push(i);
            while let Some(j) = stack.pop() {
                let (jx, jy) = ((j as i32) % w, (j as i32) / w);
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let (nx, ny) = (jx + dx, jy + dy);
                        if nx < 0 || ny < 0 || nx >= w || ny >= h {
                            continue;
                        }
                        let n = (ny * w + nx) as usize;
                        if out[n] == 0 && mag[n] >= low {
                            out[n] = 255;
                            stack.push(n);
                        }
                    }
                }
            }
        }
    }

    GrayImage::from_raw(img.width(), img.height(), out)
        .unwrap_or_else(|| GrayImage::new(img.width(), img.height()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_rgb_to_gray_extremes() {
        let mut frame = RgbImage::new(2, 1);
        frame.put_pixel(0, 0, Rgb([255, 255, 255]));
        frame.put_pixel(1, 0, Rgb([0, 0, 0]));
        let gray = rgb_to_gray(&frame);
        assert_eq!(gray.get_pixel(0, 0).0[0], 255);
        assert_eq!(gray.get_pixel(1, 0).0[0], 0);
    }

    #[test]
    fn test_absdiff_and_threshold() {
        let a = GrayImage::from_pixel(2, 2, Luma([200]));
        let mut b = GrayImage::from_pixel(2, 2, Luma([200]));
        b.put_pixel(1, 1, Luma([150]));

        let diff = absdiff(&a, &b);
        assert_eq!(diff.get_pixel(0, 0).0[0], 0);
        assert_eq!(diff.get_pixel(1, 1).0[0], 50);

        let bin = threshold(&diff, 15);
        assert_eq!(bin.get_pixel(0, 0).0[0], 0);
        assert_eq!(bin.get_pixel(1, 1).0[0], 255);
    }

    #[test]
    fn test_dilate_then_erode_restores_blob() {
        // A single set pixel grows under dilation and shrinks back.
        let mut img = GrayImage::new(9, 9);
        img.put_pixel(4, 4, Luma([255]));

        let grown = dilate(&img, 1);
        assert_eq!(grown.get_pixel(3, 3).0[0], 255);
        assert_eq!(grown.get_pixel(6, 6).0[0], 0);

        let back = erode(&grown, 1);
        assert_eq!(back.get_pixel(4, 4).0[0], 255);
        assert_eq!(back.get_pixel(3, 3).0[0], 0);
    }

    #[test]
    fn test_search_window_clamps() {
        assert_eq!(search_window((50, 50), 30, 200, 100), (20, 20, 80, 80));
        assert_eq!(search_window((5, 5), 30, 200, 100), (0, 0, 35, 35));
        assert_eq!(search_window((195, 95), 30, 200, 100), (165, 65, 200, 100));
    }

    #[test]
    fn test_edge_map_finds_step_edge() {
        // Left half dark, right half bright: a vertical edge in the middle.
        let img = GrayImage::from_fn(16, 16, |x, _| Luma([if x < 8 { 0 } else { 200 }]));
        let edges = edge_map(&img, 50, 150);
        let edge_col: u32 = (1..15).map(|y| edges.get_pixel(8, y).0[0] as u32).sum();
        assert!(edge_col > 0);
        // Flat region stays empty
        assert_eq!(edges.get_pixel(2, 8).0[0], 0);
    }
}
