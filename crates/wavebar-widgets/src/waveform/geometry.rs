//! Bar geometry: resampling an amplitude series over pixel space
//!
//! The reducer produces a fixed number of points; the surface has some
//! rendered width. This second resampling stage places one bar every
//! `bar_width + bar_gap` pixels and averages the absolute amplitude of the
//! source points that fall under each bar.

/// Pixel positions and magnitudes of every rendered bar
///
/// Derived data: rebuilt whenever the series, the rendered width or the bar
/// geometry changes, never mutated in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BarLayout {
    /// X offset of each bar, increasing by the total bar width
    pub positions: Vec<f32>,
    /// Mean absolute amplitude under each bar
    pub magnitudes: Vec<f32>,
    /// `1 / max(magnitudes)`, or 0 when every bar is silent
    pub normalization_factor: f32,
}

impl BarLayout {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// `(position, magnitude)` pairs in drawing order
    pub fn bars(&self) -> impl Iterator<Item = (f32, f32)> + '_ {
        self.positions
            .iter()
            .copied()
            .zip(self.magnitudes.iter().copied())
    }

    /// Compute the layout of `series` over a surface `width` pixels wide
    ///
    /// Produces `floor(width / (bar_width + bar_gap))` bars. An empty series
    /// or a zero width gives an empty layout.
    pub fn compute(series: &[f32], width: f32, bar_width: u32, bar_gap: u32) -> Self {
        let total = bar_width.saturating_add(bar_gap).max(1) as f32;
        if series.is_empty() || !width.is_finite() || width < total {
            return Self::empty();
        }

        let len = series.len();
        let ratio = len as f64 / width as f64;
        let half = (total - 1.0) / 2.0;
        let left = half.floor() as i64;
        let right = half.round() as i64;
        let count = (width / total).floor() as usize;

        let mut positions = Vec::with_capacity(count);
        let mut magnitudes = Vec::with_capacity(count);

        for k in 0..count {
            let position = k as f32 * total;
            let center = (position as f64 * ratio).floor() as i64;
            magnitudes.push(window_mean(series, center - left, center + right));
            positions.push(position);
        }

        let max = magnitudes.iter().fold(0.0f32, |acc, m| acc.max(*m));
        let normalization_factor = if max > 0.0 { 1.0 / max } else { 0.0 };

        Self {
            positions,
            magnitudes,
            normalization_factor,
        }
    }
}

/// Mean absolute value over the in-bounds part of `[start, end]`
fn window_mean(series: &[f32], start: i64, end: i64) -> f32 {
    let last = series.len() as i64 - 1;
    let start = start.max(0);
    let end = end.min(last);
    if start > end {
        return 0.0;
    }

    let window = &series[start as usize..=end as usize];
    let sum: f32 = window.iter().map(|v| v.abs()).sum();
    sum / window.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_count_is_floor_of_width_over_total() {
        let series = vec![0.5; 800];
        for (width, bar, gap) in [(512.0, 2, 1), (100.0, 3, 2), (7.0, 1, 0), (10.0, 4, 1)] {
            let layout = BarLayout::compute(&series, width, bar, gap);
            assert_eq!(
                layout.len(),
                (width / (bar + gap) as f32).floor() as usize,
                "width {} bar {} gap {}",
                width,
                bar,
                gap
            );
            assert_eq!(layout.positions.len(), layout.magnitudes.len());
        }
    }

    #[test]
    fn test_extreme_bar_sizes_do_not_overflow() {
        let layout = BarLayout::compute(&[0.5; 16], 512.0, u32::MAX, 1);
        assert!(layout.is_empty());
    }

    #[test]
    fn test_positions_are_spaced_by_total_width() {
        let layout = BarLayout::compute(&[1.0; 64], 30.0, 2, 1);
        assert_eq!(layout.positions, vec![0.0, 3.0, 6.0, 9.0, 12.0, 15.0, 18.0, 21.0, 24.0, 27.0]);
    }

    #[test]
    fn test_magnitude_is_mean_absolute_window() {
        // ratio 1, total 3 -> window [i-1, i+1]
        let series = [-1.0, 0.5, 0.0, 1.0, -0.5, 0.25];
        let layout = BarLayout::compute(&series, 6.0, 2, 1);
        assert_eq!(layout.len(), 2);
        // Bar 0 at 0: window clipped to [0, 1]
        assert!((layout.magnitudes[0] - 0.75).abs() < 1e-6);
        // Bar 1 at 3: window [2, 4]
        assert!((layout.magnitudes[1] - 0.5).abs() < 1e-6);
        assert!((layout.normalization_factor - 1.0 / 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_empty_and_silent_inputs() {
        assert!(BarLayout::compute(&[], 512.0, 2, 1).is_empty());
        assert!(BarLayout::compute(&[1.0], 0.0, 2, 1).is_empty());

        let silent = BarLayout::compute(&[0.0; 100], 90.0, 2, 1);
        assert_eq!(silent.len(), 30);
        assert_eq!(silent.normalization_factor, 0.0);
    }

    #[test]
    fn test_zero_total_width_does_not_divide_by_zero() {
        let layout = BarLayout::compute(&[0.5; 10], 5.0, 0, 0);
        assert_eq!(layout.len(), 5);
    }
}
