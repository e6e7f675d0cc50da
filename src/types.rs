//! Shared geometry and color primitives

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// Rectangle with position and size (units depend on context: canvas
/// rectangles are millimeters, page rectangles are points)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// RGB color with channels in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Parse a 6-hex-digit color, leading `#` optional.
    pub fn from_hex(hex: &str) -> EngineResult<Self> {
        let (r, g, b) = parse_hex_rgb(hex)?;
        Ok(Self {
            r: r as f64 / 255.0,
            g: g as f64 / 255.0,
            b: b as f64 / 255.0,
        })
    }

    pub fn black() -> Self {
        Self { r: 0.0, g: 0.0, b: 0.0 }
    }

    pub fn white() -> Self {
        Self { r: 1.0, g: 1.0, b: 1.0 }
    }
}

/// Parse a hex color into 8-bit RGB channels.
pub fn parse_hex_rgb(hex: &str) -> EngineResult<(u8, u8, u8)> {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(EngineError::InvalidColor(hex.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| EngineError::InvalidColor(hex.to_string()))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// CMYK color with channels as integer percentages in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cmyk {
    pub c: u8,
    pub m: u8,
    pub y: u8,
    pub k: u8,
}

impl Cmyk {
    pub const fn new(c: u8, m: u8, y: u8, k: u8) -> Self {
        Self { c, m, y, k }
    }

    /// Solid black, the documented fallback for malformed color input.
    pub const fn black() -> Self {
        Self { c: 0, m: 0, y: 0, k: 100 }
    }
}
