//! Color values carried by drawing elements.

use serde::{Deserialize, Serialize};

/// RGB color with u8 components.
///
/// Serialized as `{"r": .., "g": .., "b": ..}`; missing components are 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    #[serde(default)]
    pub r: u8,
    #[serde(default)]
    pub g: u8,
    #[serde(default)]
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex string: `RRGGBB`, or Excel's `AARRGGBB` with the alpha
    /// byte dropped. A leading `#` is optional.
    pub fn from_hex(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let rgb = match hex.len() {
            6 => hex,
            8 => hex.get(2..)?,
            _ => return None,
        };
        let r = u8::from_str_radix(rgb.get(0..2)?, 16).ok()?;
        let g = u8::from_str_radix(rgb.get(2..4)?, 16).ok()?;
        let b = u8::from_str_radix(rgb.get(4..6)?, 16).ok()?;
        Some(Self { r, g, b })
    }

    /// Convert to hex string (#RRGGBB).
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Components scaled to `0.0..=1.0`, as PDF color operators take them.
    pub fn to_unit(self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }
}
