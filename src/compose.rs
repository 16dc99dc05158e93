//! Alpha-blends a glyph onto a frame (CPU-based).

use image::{RgbImage, RgbaImage};

use crate::trajectory::PixelPos;

/// Composite `glyph` onto a copy of `frame` with its top-left corner at `pos`.
///
/// The glyph rectangle is clipped to the frame bounds; a fully off-frame
/// placement returns the frame unmodified. Per pixel the blend is
/// `alpha * glyph + (1 - alpha) * frame` with `alpha = glyph_alpha / 255`.
/// The input frame is never mutated.
pub fn composite_glyph(frame: &RgbImage, glyph: &RgbaImage, pos: PixelPos) -> RgbImage {
    let mut result = frame.clone();

    let frame_w = frame.width() as i32;
    let frame_h = frame.height() as i32;
    let glyph_w = glyph.width() as i32;
    let glyph_h = glyph.height() as i32;

    // Clip the glyph rectangle to the frame.
    let x1 = pos.x.max(0);
    let y1 = pos.y.max(0);
    let x2 = (pos.x + glyph_w).min(frame_w);
    let y2 = (pos.y + glyph_h).min(frame_h);

    if x2 <= x1 || y2 <= y1 {
        return result;
    }

    for dy in y1..y2 {
        for dx in x1..x2 {
            let src = glyph.get_pixel((dx - pos.x) as u32, (dy - pos.y) as u32);
            let src_a = src.0[3];
            if src_a == 0 {
                continue;
            }

            let alpha = src_a as f32 / 255.0;
            let inv_alpha = 1.0 - alpha;
            let dst = result.get_pixel_mut(dx as u32, dy as u32);
            for c in 0..3 {
                dst.0[c] = (src.0[c] as f32 * alpha + dst.0[c] as f32 * inv_alpha) as u8;
            }
        }
    }

    result
}
