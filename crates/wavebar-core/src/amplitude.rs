//! Amplitude reduction for bar waveforms
//!
//! Reduces per-channel sample arrays to a fixed number of points:
//!
//! 1. Each channel is resampled to `points` values by linear interpolation
//! 2. Channels are averaged element-wise
//! 3. Optionally mapped to a dB-like scale (`lin2log`, -60 dB floor)
//! 4. Optionally normalised by the largest magnitude
//!
//! Interpolation runs per channel before averaging so per-channel resampling
//! artifacts are smoothed by the average instead of compounding.
//!
//! Precomputed JSON documents bypass reduction entirely, see
//! [`parse_waveform_json`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LoadError;

/// Default number of points per waveform
pub const DEFAULT_POINTS: usize = 800;

/// Smallest magnitude considered by `lin2log` (-60 dB)
const LOG_FLOOR: f32 = 0.001;

/// Reduction settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReduceOptions {
    /// Output length
    pub points: usize,
    /// Divide by the maximum magnitude so peaks reach ±1
    pub normalise: bool,
    /// Map linear amplitude to the -60..0 dB scale
    pub logarithmic: bool,
}

impl Default for ReduceOptions {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            normalise: true,
            logarithmic: true,
        }
    }
}

/// Reduced waveform magnitudes, one per point
///
/// Immutable once built. Serializes as a plain JSON number array, which is
/// also the format stored in the waveform cache.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AmplitudeSeries(Vec<f32>);

impl AmplitudeSeries {
    pub fn new(values: Vec<f32>) -> Self {
        Self(values)
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, f32> {
        self.0.iter()
    }

    /// Largest absolute value (0.0 for an empty series)
    pub fn peak(&self) -> f32 {
        self.0.iter().fold(0.0f32, |max, v| max.max(v.abs()))
    }

    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for AmplitudeSeries {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Linear interpolation: `x` at `a = 0`, `y` at `a = 1`
pub fn interpolate(x: f32, y: f32, a: f32) -> f32 {
    x * (1.0 - a) + y * a
}

/// Map a linear amplitude to the dB scale, preserving sign
///
/// Magnitudes below -60 dB map to 0, 0 dB maps to ±1.
pub fn lin2log(value: f32) -> f32 {
    if value.abs() <= LOG_FLOOR {
        return 0.0;
    }
    let magnitude = value.abs().min(1.0);
    value.signum() * (3.0 + magnitude.log10()) / 3.0
}

/// Resample `source` to exactly `points` values by linear interpolation
///
/// Neighbours past the end of the source read as silence.
pub fn resample(source: &[f32], points: usize) -> Vec<f32> {
    if points == 0 {
        return Vec::new();
    }

    let step = source.len() as f64 / points as f64;
    (0..points)
        .map(|j| {
            let incr = j as f64 * step;
            let x = incr.floor() as usize;
            let a = source.get(x).copied().unwrap_or(0.0);
            let b = source.get(x + 1).copied().unwrap_or(0.0);
            interpolate(a, b, (incr - x as f64) as f32)
        })
        .collect()
}

/// Element-wise mean of equally sized channel arrays
pub fn average_channels(channels: &[Vec<f32>]) -> Vec<f32> {
    match channels {
        [] => Vec::new(),
        [single] => single.clone(),
        _ => {
            let len = channels.iter().map(Vec::len).max().unwrap_or(0);
            let count = channels.len() as f32;
            (0..len)
                .map(|i| {
                    channels
                        .iter()
                        .map(|ch| ch.get(i).copied().unwrap_or(0.0))
                        .sum::<f32>()
                        / count
                })
                .collect()
        }
    }
}

/// Divide every value by the largest magnitude; silence stays silent
pub fn normalise(values: &mut [f32]) {
    let max = values.iter().fold(0.0f32, |max, v| max.max(v.abs()));
    if max > 0.0 {
        for v in values.iter_mut() {
            *v /= max;
        }
    }
}

/// Reduce decoded channels to an `AmplitudeSeries` of `options.points` values
pub fn reduce(channels: &[Vec<f32>], options: &ReduceOptions) -> AmplitudeSeries {
    let resampled: Vec<Vec<f32>> = channels
        .iter()
        .map(|channel| resample(channel, options.points))
        .collect();

    let mut values = if resampled.is_empty() {
        vec![0.0; options.points]
    } else {
        average_channels(&resampled)
    };

    if options.logarithmic {
        for v in values.iter_mut() {
            *v = lin2log(*v);
        }
    }

    if options.normalise {
        normalise(&mut values);
    }

    log::debug!(
        "reduce: {} channel(s) -> {} points (log: {}, normalise: {})",
        channels.len(),
        values.len(),
        options.logarithmic,
        options.normalise
    );

    AmplitudeSeries(values)
}

/// Parse a precomputed waveform document
///
/// Accepts either a flat number array or an object whose first entry (in
/// document order) holds the number array. Values are used verbatim.
pub fn parse_waveform_json(bytes: &[u8]) -> Result<AmplitudeSeries, LoadError> {
    let document: Value = serde_json::from_slice(bytes)
        .map_err(|e| LoadError::InvalidData(format!("waveform JSON: {}", e)))?;

    let array = match &document {
        Value::Array(values) => values,
        Value::Object(map) => match map.iter().next() {
            Some((_, Value::Array(values))) => values,
            Some((label, _)) => {
                return Err(LoadError::InvalidData(format!(
                    "waveform entry {:?} is not an array",
                    label
                )))
            }
            None => return Err(LoadError::InvalidData("empty waveform object".to_string())),
        },
        _ => {
            return Err(LoadError::InvalidData(
                "expected a number array or an object of arrays".to_string(),
            ))
        }
    };

    array
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|n| n as f32)
                .ok_or_else(|| LoadError::InvalidData(format!("non-numeric sample {}", v)))
        })
        .collect::<Result<Vec<f32>, _>>()
        .map(AmplitudeSeries)
}
