//! Bar waveform widgets for the wavebar player
//!
//! ## Architecture (iced 0.14 patterns)
//!
//! - **View state**: `WaveformView` owns the series, layout and progress and
//!   renders into a host surface
//! - **View functions**: `waveform_bars` takes the view plus seek and resize
//!   callbacks and returns an `Element<Message>`
//! - **Canvas Programs**: replay the rendered bars and translate mouse input
//!   and layout changes into callbacks
//!
//! `WaveformPlayer` combines a media `Player`, a view and a waveform loader.

pub mod player;
pub mod theme;
pub mod waveform;

pub use player::WaveformPlayer;
pub use theme::{to_color, PROGRESS_COLOR, SURFACE_BACKGROUND, WAVE_COLOR};

pub use waveform::{
    waveform_bars, BarLayout, CanvasHost, ContainerRef, DrawContext, Fill, Host, HostEvent,
    Renderer, SeekRequest, ViewPhase, WaveformView,
};
