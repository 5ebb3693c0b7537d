//! Player configuration
//!
//! Configuration is stored as YAML in the user's config directory.
//! Default location: ~/.config/wavebar/config.yaml
//!
//! Every section is `#[serde(default)]`, so partial files are valid. A
//! missing or unparsable file falls back to defaults with a warning.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::amplitude::ReduceOptions;
use crate::color::{HexColor, Rgb};

/// Default cache namespace for reduced waveforms
pub const DEFAULT_CACHE_NAMESPACE: &str = "wavebar";

/// Default resize debounce (trailing edge)
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u64 = 100;

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WavebarConfig {
    /// Waveform view options
    pub view: ViewOptions,
    /// Amplitude reduction settings for decoded audio
    pub waveform: ReduceOptions,
    /// Prefix for waveform cache keys (`<namespace>:<url>`)
    pub cache_namespace: String,
}

impl Default for WavebarConfig {
    fn default() -> Self {
        Self {
            view: ViewOptions::default(),
            waveform: ReduceOptions::default(),
            cache_namespace: DEFAULT_CACHE_NAMESPACE.to_string(),
        }
    }
}

/// Waveform view configuration
///
/// An immutable snapshot: the view replaces its copy wholesale on every
/// option change and diffs old against new to decide what to recompute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    /// Surface width in pixels (ignored in responsive mode)
    pub width: u32,
    /// Surface height in pixels
    pub height: u32,
    /// Bar width in pixels
    pub bar_width: u32,
    /// Gap between bars in pixels
    pub bar_gap: u32,
    /// Color of the unplayed part of the waveform
    pub wave_color: HexColor,
    /// Color of the played part of the waveform
    pub progress_color: HexColor,
    /// Track the container width instead of `width`
    pub responsive: bool,
    /// Click to seek
    pub interact: bool,
    /// Glossy three-stop gradient bars instead of flat fills
    pub gradient: bool,
    /// Redraw immediately when new data is set
    pub redraw: bool,
    /// Trailing-edge debounce for resize events
    pub resize_debounce_ms: u64,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            width: 512,
            height: 128,
            bar_width: 2,
            bar_gap: 1,
            wave_color: HexColor::from_rgb(Rgb::new(0x99, 0x99, 0x99)),
            progress_color: HexColor::from_rgb(Rgb::new(0x55, 0x55, 0x55)),
            responsive: false,
            interact: true,
            gradient: true,
            redraw: true,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
        }
    }
}

impl ViewOptions {
    /// Combined horizontal footprint of one bar
    pub fn total_bar_width(&self) -> u32 {
        self.bar_width.saturating_add(self.bar_gap)
    }
}

/// Get the default config file path
///
/// Returns: ~/.config/wavebar/config.yaml
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
        .join("wavebar")
        .join("config.yaml")
}

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
pub fn load_config(path: &Path) -> WavebarConfig {
    log::info!("load_config: Loading from {:?}", path);

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!("load_config: Config file doesn't exist, using defaults");
            return WavebarConfig::default();
        }
        Err(e) => {
            log::warn!("load_config: Failed to read config file: {}, using defaults", e);
            return WavebarConfig::default();
        }
    };

    match serde_yaml::from_str::<WavebarConfig>(&contents) {
        Ok(config) => {
            log::info!(
                "load_config: Loaded config - {}x{} bars {}+{}, responsive: {}, points: {}",
                config.view.width,
                config.view.height,
                config.view.bar_width,
                config.view.bar_gap,
                config.view.responsive,
                config.waveform.points
            );
            config
        }
        Err(e) => {
            log::warn!("load_config: Failed to parse config: {}, using defaults", e);
            WavebarConfig::default()
        }
    }
}

/// Save configuration to a YAML file
///
/// Creates parent directories if they don't exist.
pub fn save_config(config: &WavebarConfig, path: &Path) -> Result<()> {
    log::info!("save_config: Saving to {:?}", path);

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
    }

    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    std::fs::write(path, yaml)
        .with_context(|| format!("Failed to write config file: {:?}", path))?;

    log::info!("save_config: Config saved successfully");
    Ok(())
}
