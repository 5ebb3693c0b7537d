//! Bar waveform: geometry, rendering, host contract and view state
//!
//! ## Pipeline
//!
//! ```text
//! AmplitudeSeries ──► BarLayout::compute ──► Renderer::draw ──► DrawContext
//!        ▲                 (width, bar geometry)     (progress, colors)
//!        │
//!   WaveformView (owns series, layout, progress; reacts to resize/click/options)
//! ```
//!
//! - **geometry**: pixel-space resampling of the series into bars
//! - **renderer**: stateless painter over the `DrawContext` trait
//! - **host**: container/surface/listener contract and the retained `CanvasHost`
//! - **view**: the state machine tying it together
//! - **canvas** / **widget**: iced `Program` and view function

mod canvas;
mod debounce;
mod geometry;
mod host;
mod renderer;
mod view;
mod widget;

pub use canvas::{FrameContext, WaveformCanvas, WaveformInteraction};
pub use debounce::Debouncer;
pub use geometry::BarLayout;
pub use host::{
    CanvasHost, ContainerRef, CssLength, DrawList, DrawOp, ElementId, Host, HostEvent,
    HostListener, MountedSurface, SurfaceId, SurfaceStyle,
};
pub use renderer::{
    BarFrame, DrawContext, Fill, LinearGradient, Renderer, GRADIENT_STOPS, MIN_BAR_HEIGHT,
};
pub use view::{Recompute, SeekRequest, ViewPhase, WaveformView};
pub use widget::waveform_bars;
