//! Linear image accumulation and tone mapping to 8-bit.

use crate::Color;
use noct_math::Interval;

/// Display gamma applied after clamping.
pub const GAMMA: f64 = 2.2;

/// Map a linear intensity to an 8-bit display value.
///
/// Clamps to [0, 1], applies the 1/2.2 gamma curve and rounds to nearest.
#[inline]
pub fn to_display(linear: f64) -> u8 {
    let clamped = Interval::UNIT.clamp(linear);
    (clamped.powf(1.0 / GAMMA) * 255.0 + 0.5) as u8
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    [to_display(color.x), to_display(color.y), to_display(color.z)]
}

/// Row-major buffer of linear pixel colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Tone-mapped pixels in row-major order.
    pub fn to_rgb8(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().copied().map(color_to_rgb).collect()
    }
}
