//! Replacement cursor glyphs.
//!
//! A glyph is an RGBA bitmap with its hotspot at the top-left corner. The
//! [`GlyphProvider`] trait keeps rasterization swappable; [`BuiltinGlyphs`]
//! renders the six stock styles with plain polygon/circle rasterization.

mod shapes;

use image::RgbaImage;

use crate::config::{CursorColor, CursorStyle};

/// Maps (style, size, color) to an RGBA bitmap.
///
/// Providers must return a `size_px` x `size_px` bitmap; callers treat the
/// top-left pixel as the hotspot.
pub trait GlyphProvider {
    fn glyph(&self, style: CursorStyle, size_px: u32, color: CursorColor) -> RgbaImage;
}

/// Stock glyph renderer for the built-in cursor styles.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinGlyphs;

impl GlyphProvider for BuiltinGlyphs {
    fn glyph(&self, style: CursorStyle, size_px: u32, color: CursorColor) -> RgbaImage {
        let size = size_px.max(4);
        let rgb = color.rgb();
        match style {
            CursorStyle::Fancy => shapes::fancy_arrow(size),
            CursorStyle::Macos => shapes::macos_arrow(size),
            CursorStyle::Circle => shapes::circle(size, rgb),
            CursorStyle::Dot => shapes::dot(size, rgb),
            CursorStyle::Ring => shapes::ring(size, rgb),
            CursorStyle::Crosshair => shapes::crosshair(size, rgb),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opaque_count(img: &RgbaImage) -> usize {
        img.pixels().filter(|p| p.0[3] > 0).count()
    }

    #[test]
    fn test_all_styles_render_at_requested_size() {
        let provider = BuiltinGlyphs;
        for style in [
            CursorStyle::Fancy,
            CursorStyle::Macos,
            CursorStyle::Circle,
            CursorStyle::Dot,
            CursorStyle::Ring,
            CursorStyle::Crosshair,
        ] {
            let glyph = provider.glyph(style, 48, CursorColor::White);
            assert_eq!(glyph.width(), 48);
            assert_eq!(glyph.height(), 48);
            assert!(opaque_count(&glyph) > 0, "{:?} rendered empty", style);
        }
    }

    #[test]
    fn test_colored_styles_carry_color() {
        let provider = BuiltinGlyphs;
        let glyph = provider.glyph(CursorStyle::Dot, 24, CursorColor::Red);
        let has_red = glyph
            .pixels()
            .any(|p| p.0 == [255, 0, 0, 255]);
        assert!(has_red);
    }

    #[test]
    fn test_ring_is_hollow() {
        let provider = BuiltinGlyphs;
        let glyph = provider.glyph(CursorStyle::Ring, 40, CursorColor::White);
        let center = glyph.get_pixel(20, 20);
        assert_eq!(center.0[3], 0, "ring center should be transparent");
    }

    #[test]
    fn test_dot_smaller_than_circle() {
        let provider = BuiltinGlyphs;
        let dot = provider.glyph(CursorStyle::Dot, 32, CursorColor::White);
        let circle = provider.glyph(CursorStyle::Circle, 32, CursorColor::White);
        assert!(opaque_count(&dot) < opaque_count(&circle));
    }
}
