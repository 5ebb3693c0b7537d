//! Color model for waveform rendering
//!
//! Conversions between hex, RGB and HSV, plus the two-stop `ColorPair`
//! (base color and a brightened variant) used for glossy bar gradients.

use serde::{Deserialize, Serialize};

use crate::error::ColorError;

/// HSV value boost applied to derive the bright gradient stop
pub const BRIGHTNESS_BOOST: f32 = 1.4;

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Per-channel linear interpolation from `self` (t = 0) to `other` (t = 1)
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| to_channel(a as f32 * (1.0 - t) + b as f32 * t);
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }

    /// CSS `rgb(r, g, b)` notation
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Lowercase `#rrggbb` notation
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Channels as floats in 0.0..=1.0
    pub fn to_unit(&self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }
}

/// HSV color: hue in degrees [0, 360), saturation and value in percent.
///
/// Values produced by [`rgb_to_hsv`] are whole numbers. `v` may exceed 100
/// after a brightness boost; [`hsv_to_rgb`] clamps at the RGB stage.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Round and clamp a 0..255 float to a channel byte
fn to_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Parse a 6-digit hex color, with or without a leading `#`
pub fn hex_to_rgb(hex: &str) -> Result<Rgb, ColorError> {
    let digits = hex.trim().trim_start_matches('#');
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorError::InvalidColorFormat(hex.to_string()));
    }
    let value = u32::from_str_radix(digits, 16)
        .map_err(|_| ColorError::InvalidColorFormat(hex.to_string()))?;

    Ok(Rgb {
        r: ((value >> 16) & 0xff) as u8,
        g: ((value >> 8) & 0xff) as u8,
        b: (value & 0xff) as u8,
    })
}

pub fn rgb_to_hsv(rgb: Rgb) -> Hsv {
    let r = rgb.r as f32;
    let g = rgb.g as f32;
    let b = rgb.b as f32;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let v = (max / 255.0 * 100.0).round();
    if delta == 0.0 {
        return Hsv { h: 0.0, s: 0.0, v };
    }

    let s = (delta / max * 100.0).round();
    let sector = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    let h = (sector * 60.0).round() % 360.0;

    Hsv { h, s, v }
}

pub fn hsv_to_rgb(hsv: Hsv) -> Rgb {
    let v = hsv.v / 100.0;
    let s = (hsv.s / 100.0).clamp(0.0, 1.0);

    if s == 0.0 {
        let gray = to_channel(v * 255.0);
        return Rgb::new(gray, gray, gray);
    }

    let h = hsv.h.rem_euclid(360.0) / 60.0;
    let sector = (h.floor() as i32).rem_euclid(6);
    let f = h - h.floor();

    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match sector {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };

    Rgb::new(to_channel(r * 255.0), to_channel(g * 255.0), to_channel(b * 255.0))
}

/// Brightened variant of a color (HSV value boosted by 40%)
pub fn brighten(rgb: Rgb) -> Rgb {
    let hsv = rgb_to_hsv(rgb);
    hsv_to_rgb(Hsv {
        v: hsv.v * BRIGHTNESS_BOOST,
        ..hsv
    })
}

/// Base color and its brightened variant, used as gradient stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPair {
    pub base: Rgb,
    pub bright: Rgb,
}

impl ColorPair {
    pub fn from_rgb(base: Rgb) -> Self {
        Self {
            base,
            bright: brighten(base),
        }
    }

    /// Derive a pair from a hex string
    pub fn derive(hex: &str) -> Result<Self, ColorError> {
        hex_to_rgb(hex).map(Self::from_rgb)
    }
}

impl From<&HexColor> for ColorPair {
    fn from(color: &HexColor) -> Self {
        Self::from_rgb(color.rgb())
    }
}

/// A validated hex color option
///
/// Stored normalized as `#rrggbb`; deserialization rejects malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor {
    rgb: Rgb,
}

impl HexColor {
    pub const fn from_rgb(rgb: Rgb) -> Self {
        Self { rgb }
    }

    pub fn parse(hex: &str) -> Result<Self, ColorError> {
        hex_to_rgb(hex).map(|rgb| Self { rgb })
    }

    pub fn rgb(&self) -> Rgb {
        self.rgb
    }

    pub fn as_hex(&self) -> String {
        self.rgb.to_hex()
    }
}

impl TryFrom<String> for HexColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.as_hex()
    }
}

impl std::str::FromStr for HexColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for HexColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_hex())
    }
}
