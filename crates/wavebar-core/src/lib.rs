//! Wavebar Core - amplitude pipeline, loading and transport for the wavebar player
//!
//! Everything here is independent of the UI toolkit:
//!
//! - **color**: hex/RGB/HSV conversions and gradient color pairs
//! - **amplitude**: reduction of raw samples to a fixed number of points
//! - **decode**: audio decoding facility (symphonia)
//! - **source**: waveform loading strategies with a key/value cache
//! - **transport**: media element contract and the per-instance `Player`
//! - **playlist**: track sequencing on top of a player
//! - **config**: YAML configuration and view options

pub mod amplitude;
pub mod cache;
pub mod color;
pub mod config;
pub mod decode;
pub mod error;
pub mod playlist;
pub mod source;
pub mod transport;

pub use amplitude::{AmplitudeSeries, ReduceOptions};
pub use color::{ColorPair, HexColor, Rgb};
pub use config::{ViewOptions, WavebarConfig};
pub use error::{ColorError, ConfigError, LoadError, MediaErrorKind};
pub use source::{Track, WaveformSource};
pub use transport::{MediaElement, MediaEvent, MediaEventKind, Player, PlayerEvent};
