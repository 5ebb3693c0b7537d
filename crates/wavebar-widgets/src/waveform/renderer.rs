//! Waveform renderer
//!
//! Paints a [`BarLayout`] onto any [`DrawContext`]. The renderer is stateless:
//! every call receives the current layout, colors and progress by reference
//! and keeps nothing between calls.
//!
//! Bars left of the progress split use the progress color, bars right of it
//! the wave color. The single bar straddling the split is blended between
//! the two by how far the split reaches into it.

use wavebar_core::color::{ColorPair, Rgb};

use super::geometry::BarLayout;

/// Bars never shrink below this height so silence stays visible
pub const MIN_BAR_HEIGHT: f32 = 0.5;

/// Gradient stop offsets for bright / base / bright
pub const GRADIENT_STOPS: [f32; 3] = [0.0, 0.3, 1.0];

/// Vertical linear gradient in surface coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct LinearGradient {
    pub start: (f32, f32),
    pub end: (f32, f32),
    pub stops: Vec<(f32, Rgb)>,
}

impl LinearGradient {
    /// Top-to-bottom gradient spanning `height` pixels
    pub fn vertical(height: f32) -> Self {
        Self {
            start: (0.0, 0.0),
            end: (0.0, height),
            stops: Vec::with_capacity(GRADIENT_STOPS.len()),
        }
    }

    pub fn add_stop(mut self, offset: f32, color: Rgb) -> Self {
        self.stops.push((offset.clamp(0.0, 1.0), color));
        self
    }

    /// The glossy bright/base/bright bar gradient
    pub fn glossy(pair: &ColorPair, height: f32) -> Self {
        Self::vertical(height)
            .add_stop(GRADIENT_STOPS[0], pair.bright)
            .add_stop(GRADIENT_STOPS[1], pair.base)
            .add_stop(GRADIENT_STOPS[2], pair.bright)
    }
}

/// Fill style for a bar
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    Solid(Rgb),
    Linear(LinearGradient),
}

impl Fill {
    /// Flat base color, or the glossy gradient when `gradient` is set
    pub fn for_pair(pair: &ColorPair, gradient: bool, height: f32) -> Self {
        if gradient {
            Fill::Linear(LinearGradient::glossy(pair, height))
        } else {
            Fill::Solid(pair.base)
        }
    }
}

/// 2D drawing primitives the renderer needs from a surface
pub trait DrawContext {
    fn clear_rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: &Fill);
}

/// Borrowed render input for a single draw
#[derive(Debug, Clone, Copy)]
pub struct BarFrame<'a> {
    pub layout: &'a BarLayout,
    pub wave: &'a ColorPair,
    pub progress: &'a ColorPair,
    /// Playback progress in [0, 1]
    pub progress_value: f32,
    pub width: f32,
    pub height: f32,
    pub bar_width: f32,
    pub bar_gap: f32,
    pub gradient: bool,
}

impl BarFrame<'_> {
    fn total_bar_width(&self) -> f32 {
        (self.bar_width + self.bar_gap).max(1.0)
    }
}

/// Stateless bar painter
#[derive(Debug, Default, Clone, Copy)]
pub struct Renderer;

impl Renderer {
    /// Clear the surface and paint every bar of the frame
    pub fn draw<C: DrawContext + ?Sized>(ctx: &mut C, frame: &BarFrame<'_>) {
        ctx.clear_rect(0.0, 0.0, frame.width, frame.height);
        if frame.layout.is_empty() {
            return;
        }

        let total = frame.total_bar_width();
        let split_x = frame.progress_value.clamp(0.0, 1.0) * frame.width;
        let progress_fill = Fill::for_pair(frame.progress, frame.gradient, frame.height);
        let wave_fill = Fill::for_pair(frame.wave, frame.gradient, frame.height);
        let factor = frame.layout.normalization_factor;

        let mut past_split = false;

        for (position, magnitude) in frame.layout.bars() {
            let height = (frame.height * magnitude * factor).max(MIN_BAR_HEIGHT);
            let y = (frame.height - height) / 2.0;

            if !past_split && position >= split_x {
                past_split = true;
            }

            if past_split {
                ctx.fill_rect(position, y, frame.bar_width, height, &wave_fill);
            } else if position + total > split_x {
                // Bar straddles the split
                let blend = (split_x - position) / total;
                let mixed = frame.wave.base.lerp(frame.progress.base, blend);
                let fill = Fill::for_pair(&ColorPair::from_rgb(mixed), frame.gradient, frame.height);
                ctx.fill_rect(position, y, frame.bar_width, height, &fill);
            } else {
                ctx.fill_rect(position, y, frame.bar_width, height, &progress_fill);
            }
        }
    }
}
