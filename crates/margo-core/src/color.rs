//! Deterministic color assignment for themes and codes.
//!
//! Themes receive evenly spaced hues so adjacent themes stay visually
//! distinct; codes within a theme share its hue and are separated by alpha
//! alone. The same guide always produces the same palette.

use serde::{Deserialize, Serialize};

/// An RGBA color. Channel values are 0..=255, alpha is 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Same color with the given alpha, clamped to 0.0..=1.0.
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self {
            a: alpha.clamp(0.0, 1.0),
            ..self
        }
    }

    /// CSS `rgba(...)` form used for highlight backgrounds.
    pub fn to_css(self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Hue saturation/lightness used for all generated palette entries.
const PALETTE_SATURATION: f32 = 0.65;
const PALETTE_LIGHTNESS: f32 = 0.55;

/// Generate `n` visually distinct opaque colors.
///
/// Hues are evenly spaced around the wheel, so the palette for `n` themes is
/// stable across sessions and machines.
pub fn distinct_colors(n: usize) -> Vec<Color> {
    (0..n)
        .map(|i| {
            let hue = (i as f32) * 360.0 / (n.max(1) as f32);
            hsl_to_rgb(hue, PALETTE_SATURATION, PALETTE_LIGHTNESS)
        })
        .collect()
}

fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Color {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = (h % 360.0) / 60.0;
    let x = c * (1.0 - (h_prime % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    Color {
        r: ((r1 + m) * 255.0).round() as u8,
        g: ((g1 + m) * 255.0).round() as u8,
        b: ((b1 + m) * 255.0).round() as u8,
        a: 1.0,
    }
}
