//! Plain rasterizers for the stock glyph shapes.
//!
//! No antialiasing here; glyph rendering quality is out of scope, only the
//! silhouette matters for compositing.

use image::{Rgba, RgbaImage};

const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

fn solid(rgb: [u8; 3]) -> Rgba<u8> {
    Rgba([rgb[0], rgb[1], rgb[2], 255])
}

/// Fill a polygon with even-odd scanline crossing.
fn fill_polygon(img: &mut RgbaImage, points: &[(f32, f32)], color: Rgba<u8>) {
    if points.len() < 3 {
        return;
    }
    let height = img.height() as i32;
    let width = img.width() as i32;

    for y in 0..height {
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
            let start = (pair[0].ceil() as i32).max(0);
            let end = (pair[1].floor() as i32).min(width - 1);
            for x in start..=end {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Fill every pixel within `radius` of `center`.
fn fill_circle(img: &mut RgbaImage, center: (i32, i32), radius: i32, color: Rgba<u8>) {
    stroke_band(img, center, 0, radius, color);
}

/// Fill the band of pixels whose distance from `center` lies in [inner, outer].
fn stroke_band(img: &mut RgbaImage, center: (i32, i32), inner: i32, outer: i32, color: Rgba<u8>) {
    let (cx, cy) = center;
    let inner_sq = (inner * inner) as i64;
    let outer_sq = (outer * outer) as i64;
    for y in (cy - outer).max(0)..=(cy + outer).min(img.height() as i32 - 1) {
        for x in (cx - outer).max(0)..=(cx + outer).min(img.width() as i32 - 1) {
            let dx = (x - cx) as i64;
            let dy = (y - cy) as i64;
            let d_sq = dx * dx + dy * dy;
            if d_sq >= inner_sq && d_sq <= outer_sq {
                img.put_pixel(x as u32, y as u32, color);
            }
        }
    }
}

/// Modern arrow: black silhouette with an inset white fill, tip at top-left.
pub fn fancy_arrow(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let s = size as f32;

    let outline = [(0.12 * s, 0.02 * s), (0.12 * s, 0.72 * s), (0.52 * s, 0.32 * s)];
    fill_polygon(&mut img, &outline, BLACK);

    let border = (0.05 * s).max(1.0);
    let inner = [
        (0.12 * s + border, 0.02 * s + 2.0 * border),
        (0.12 * s + border, 0.72 * s - 2.5 * border),
        (0.52 * s - 2.5 * border, 0.32 * s),
    ];
    fill_polygon(&mut img, &inner, Rgba([255, 255, 255, 255]));

    img
}

/// macOS-style pointer with a tail, black outline and white fill.
pub fn macos_arrow(size: u32) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let s = size as f32;

    let outline = [
        (0.12 * s, 0.0),
        (0.12 * s, 0.72 * s),
        (0.28 * s, 0.56 * s),
        (0.45 * s, 0.82 * s),
        (0.55 * s, 0.77 * s),
        (0.38 * s, 0.52 * s),
        (0.58 * s, 0.52 * s),
    ];
    fill_polygon(&mut img, &outline, BLACK);

    // White fill: the outline shrunk toward the tip
    let inner: Vec<(f32, f32)> = outline
        .iter()
        .map(|&(x, y)| {
            (
                (x - 0.12 * s) * 0.8 + 0.14 * s,
                y * 0.8 + 0.03 * s,
            )
        })
        .collect();
    fill_polygon(&mut img, &inner, Rgba([255, 255, 255, 255]));

    img
}

/// Filled circle with a black outline.
pub fn circle(size: u32, rgb: [u8; 3]) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let center = (size as i32 / 2, size as i32 / 2);
    let radius = size as i32 / 2 - 2;
    fill_circle(&mut img, center, radius, solid(rgb));
    stroke_band(&mut img, center, radius - 1, radius, BLACK);
    img
}

/// Small filled dot.
pub fn dot(size: u32, rgb: [u8; 3]) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let center = (size as i32 / 2, size as i32 / 2);
    fill_circle(&mut img, center, size as i32 / 3, solid(rgb));
    img
}

/// Hollow circle.
pub fn ring(size: u32, rgb: [u8; 3]) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let center = (size as i32 / 2, size as i32 / 2);
    let thickness = 3;
    let radius = size as i32 / 2 - thickness;
    stroke_band(&mut img, center, radius - thickness, radius, solid(rgb));
    img
}

/// Crosshair with a center dot.
pub fn crosshair(size: u32, rgb: [u8; 3]) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    let color = solid(rgb);
    let center = size as i32 / 2;
    let thickness = 2;

    for y in 0..size {
        for x in 0..size {
            let on_horizontal = (y as i32 - center).abs() < thickness;
            let on_vertical = (x as i32 - center).abs() < thickness;
            if on_horizontal || on_vertical {
                img.put_pixel(x, y, color);
            }
        }
    }
    fill_circle(&mut img, (center, center), 3, color);
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_polygon_triangle() {
        let mut img = RgbaImage::new(10, 10);
        fill_polygon(&mut img, &[(0.0, 0.0), (0.0, 9.0), (9.0, 9.0)], BLACK);
        // Inside the triangle
        assert_eq!(img.get_pixel(2, 8).0[3], 255);
        // Outside (upper right)
        assert_eq!(img.get_pixel(8, 1).0[3], 0);
    }

    #[test]
    fn test_crosshair_arms_reach_edges() {
        let img = crosshair(32, [255, 255, 255]);
        assert_eq!(img.get_pixel(0, 16).0[3], 255);
        assert_eq!(img.get_pixel(31, 16).0[3], 255);
        assert_eq!(img.get_pixel(16, 0).0[3], 255);
        assert_eq!(img.get_pixel(16, 31).0[3], 255);
        // Corner stays transparent
        assert_eq!(img.get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn test_arrow_tip_near_origin() {
        let img = fancy_arrow(48);
        // The silhouette occupies the upper-left region, not the far right.
        let left_half: usize = img
            .enumerate_pixels()
            .filter(|(x, _, p)| *x < 24 && p.0[3] > 0)
            .count();
        let right_half: usize = img
            .enumerate_pixels()
            .filter(|(x, _, p)| *x >= 24 && p.0[3] > 0)
            .count();
        assert!(left_half > right_half);
    }
}
