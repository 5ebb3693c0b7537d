//! Shared theme constants for wavebar UI components

use iced::Color;
use wavebar_core::color::Rgb;

/// Surface background painted on clear
///
/// Transparent, so the waveform sits on whatever the embedding UI draws.
pub const SURFACE_BACKGROUND: Color = Color::TRANSPARENT;

/// Default unplayed bar color (#999999)
pub const WAVE_COLOR: Rgb = Rgb::new(0x99, 0x99, 0x99);

/// Default played bar color (#555555)
pub const PROGRESS_COLOR: Rgb = Rgb::new(0x55, 0x55, 0x55);

/// Convert an 8-bit color to an iced color
pub fn to_color(rgb: Rgb) -> Color {
    Color::from_rgb8(rgb.r, rgb.g, rgb.b)
}
