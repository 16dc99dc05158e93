//! Render options and closed variants for style, color, and quality strings.
//!
//! Unknown strings never error: style falls back to `fancy`, color to `white`,
//! quality to `high`, matching the wire contract of the processing API.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// Cursor Style
// ============================================================================

/// Available replacement cursor styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    /// macOS-style pointer with tail.
    Macos,
    /// Filled circle.
    Circle,
    /// Small dot.
    Dot,
    /// Hollow circle.
    Ring,
    /// Crosshair target.
    Crosshair,
    /// Modern arrow with outline. Unknown wire strings land here.
    #[default]
    #[serde(other)]
    Fancy,
}

impl FromStr for CursorStyle {
    type Err = std::convert::Infallible;

    /// Unknown style ids fall back to `Fancy`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "fancy" => CursorStyle::Fancy,
            "macos" => CursorStyle::Macos,
            "circle" => CursorStyle::Circle,
            "dot" => CursorStyle::Dot,
            "ring" => CursorStyle::Ring,
            "crosshair" => CursorStyle::Crosshair,
            _ => CursorStyle::Fancy,
        })
    }
}

// ============================================================================
// Cursor Color
// ============================================================================

/// Named cursor colors accepted on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CursorColor {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    Orange,
    /// Unknown wire strings land here.
    #[default]
    #[serde(other)]
    White,
}

impl CursorColor {
    /// RGB triple for this color.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            CursorColor::Red => [255, 0, 0],
            CursorColor::Green => [0, 255, 0],
            CursorColor::Blue => [0, 0, 255],
            CursorColor::Yellow => [255, 255, 0],
            CursorColor::Cyan => [0, 255, 255],
            CursorColor::Magenta => [255, 0, 255],
            CursorColor::White => [255, 255, 255],
            CursorColor::Orange => [255, 165, 0],
        }
    }
}

impl FromStr for CursorColor {
    type Err = std::convert::Infallible;

    /// Unknown color names fall back to `White`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "red" => CursorColor::Red,
            "green" => CursorColor::Green,
            "blue" => CursorColor::Blue,
            "yellow" => CursorColor::Yellow,
            "cyan" => CursorColor::Cyan,
            "magenta" => CursorColor::Magenta,
            "white" => CursorColor::White,
            "orange" => CursorColor::Orange,
            _ => CursorColor::White,
        })
    }
}

// ============================================================================
// Quality Tier
// ============================================================================

/// Named encoder preset bundling rate-control and speed parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Balanced,
    Fast,
    /// Unknown wire strings land here.
    #[default]
    #[serde(other)]
    High,
}

impl QualityTier {
    /// x264 constant rate factor for this tier.
    pub fn crf(self) -> u8 {
        match self {
            QualityTier::High => 18,
            QualityTier::Balanced => 23,
            QualityTier::Fast => 28,
        }
    }

    /// x264 preset name for this tier.
    pub fn preset(self) -> &'static str {
        match self {
            QualityTier::High => "slow",
            QualityTier::Balanced => "medium",
            QualityTier::Fast => "fast",
        }
    }
}

impl FromStr for QualityTier {
    type Err = std::convert::Infallible;

    /// Unknown tier names fall back to `High`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "high" => QualityTier::High,
            "balanced" => QualityTier::Balanced,
            "fast" => QualityTier::Fast,
            _ => QualityTier::High,
        })
    }
}

// ============================================================================
// Render Options
// ============================================================================

/// Options for a cursor render pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderOptions {
    /// Replacement cursor style.
    pub cursor_style: CursorStyle,
    /// Cursor size in pixels.
    pub cursor_size: u32,
    /// Cursor color (ignored by the arrow styles).
    pub cursor_color: CursorColor,
    /// Whether to smooth the supplied trajectory before rendering.
    pub smooth: bool,
    /// Encoder quality tier.
    pub quality: QualityTier,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            cursor_style: CursorStyle::Fancy,
            cursor_size: 48,
            cursor_color: CursorColor::White,
            smooth: true,
            quality: QualityTier::High,
        }
    }
}
