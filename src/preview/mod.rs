//! PNG previews of SAR rasters: dB conversion, robust contrast ranges and
//! rendering with a labelled colour bar.

pub mod colormap;
pub mod font;
pub mod render;
pub mod runner;

use crate::readers::MaskedBand;
use crate::stats::{percentile_sorted, sample_values, sorted_finite};

pub use colormap::{Colormap, Scheme};
pub use render::{Figure, MIN_DPI, render, save_png};
pub use runner::{PreviewOptions, SingleOptions, run_batch, run_single};

/// Seed for percentile sub-sampling, fixed so previews are reproducible.
pub const SAMPLE_SEED: u64 = 12345;
pub const DEFAULT_SAMPLE_MAX: usize = 5_000_000;
pub const DEFAULT_PCLIP: (f64, f64) = (2.0, 98.0);
/// Plausible backscatter range used to clamp percentile stretches.
pub const SAR_DB_LIMITS: (f64, f64) = (-35.0, 5.0);

/// Linear power to decibels, `10·log10(v)`. Values `<= 0` become invalid.
pub fn to_db(band: &MaskedBand) -> MaskedBand {
    band.map_valid(|v| if v > 0.0 { 10.0 * v.log10() } else { f32::NAN })
}

/// Value range mapped onto the colour ramp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRange {
    pub min: f64,
    pub max: f64,
}

impl DisplayRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Clamps into `limits`; a range inverted by the clamp becomes
    /// `[min, min + min_span]`.
    pub fn clamp_to(self, limits: (f64, f64), min_span: f64) -> Self {
        let min = self.min.max(limits.0);
        let mut max = self.max.min(limits.1);
        if min >= max {
            max = min + min_span;
        }
        Self { min, max }
    }
}

/// Percentile range over the valid pixels of `band`.
///
/// At most `sample_max` values are used, drawn without replacement with a
/// generator seeded by `seed`. Non-finite or inverted percentiles fall back
/// to the sample's min/max, and equal bounds are widened by 1e-6.
pub fn robust_range(
    band: &MaskedBand,
    low: f64,
    high: f64,
    sample_max: Option<usize>,
    seed: u64,
) -> Option<DisplayRange> {
    let mut values = band.valid_values();
    if let Some(max) = sample_max {
        values = sample_values(values, max, seed);
    }
    let sorted = sorted_finite(&values);
    let (&first, &last) = (sorted.first()?, sorted.last()?);

    let mut lo = percentile_sorted(&sorted, low);
    let mut hi = percentile_sorted(&sorted, high);
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        lo = first;
        hi = last;
    }
    if lo == hi {
        hi = lo + 1e-6;
    }
    Some(DisplayRange::new(lo, hi))
}

/// Plain percentile range over every valid pixel, with no fallback: a
/// degenerate result becomes `[lo, lo + 1e-6]`.
pub fn percentile_range(band: &MaskedBand, low: f64, high: f64) -> Option<DisplayRange> {
    let sorted = sorted_finite(&band.valid_values());
    if sorted.is_empty() {
        return None;
    }
    let lo = percentile_sorted(&sorted, low);
    let mut hi = percentile_sorted(&sorted, high);
    if lo >= hi {
        hi = lo + 1e-6;
    }
    Some(DisplayRange::new(lo, hi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn band(values: Vec<f32>) -> MaskedBand {
        let n = values.len();
        MaskedBand::from_raw(n, 1, values, None).unwrap()
    }

    #[test]
    fn test_to_db() {
        let db = to_db(&band(vec![1.0, 0.1, 0.0, -2.0, 100.0]));
        assert_relative_eq!(db.get(0).unwrap(), 0.0);
        assert_relative_eq!(db.get(1).unwrap(), -10.0, epsilon = 1e-5);
        assert_eq!(db.get(2), None);
        assert_eq!(db.get(3), None);
        assert_relative_eq!(db.get(4).unwrap(), 20.0, epsilon = 1e-5);
    }

    #[test]
    fn test_robust_range_percentiles() {
        let values: Vec<f32> = (0..=100).map(|v| v as f32).collect();
        let range = robust_range(&band(values), 2.0, 98.0, Some(DEFAULT_SAMPLE_MAX), SAMPLE_SEED).unwrap();
        assert_relative_eq!(range.min, 2.0);
        assert_relative_eq!(range.max, 98.0);
    }

    #[test]
    fn test_robust_range_edge_cases() {
        assert_eq!(robust_range(&band(vec![f32::NAN; 3]), 2.0, 98.0, None, SAMPLE_SEED), None);

        let constant = robust_range(&band(vec![4.0; 10]), 2.0, 98.0, None, SAMPLE_SEED).unwrap();
        assert_eq!(constant.min, 4.0);
        assert_relative_eq!(constant.max, 4.0 + 1e-6);

        // inverted percentiles fall back to min/max
        let range = robust_range(&band(vec![1.0, 2.0, 3.0]), 90.0, 10.0, None, SAMPLE_SEED).unwrap();
        assert_eq!((range.min, range.max), (1.0, 3.0));
    }

    #[test]
    fn test_sampled_range_is_reproducible() {
        let values: Vec<f32> = (0..10_000).map(|v| ((v * 7919) % 10_000) as f32).collect();
        let b = band(values);
        let a = robust_range(&b, 2.0, 98.0, Some(500), SAMPLE_SEED).unwrap();
        let c = robust_range(&b, 2.0, 98.0, Some(500), SAMPLE_SEED).unwrap();
        assert_eq!(a, c);
    }

    #[test]
    fn test_clamp_to_sar_limits() {
        let clamped = DisplayRange::new(-60.0, 12.0).clamp_to(SAR_DB_LIMITS, 0.1);
        assert_eq!(clamped, DisplayRange::new(-35.0, 5.0));

        let inverted = DisplayRange::new(8.0, 12.0).clamp_to(SAR_DB_LIMITS, 0.1);
        assert_eq!(inverted.min, 8.0);
        assert_relative_eq!(inverted.max, 8.1);
    }

    #[test]
    fn test_percentile_range_degenerate() {
        let range = percentile_range(&band(vec![2.0, 2.0]), 2.0, 98.0).unwrap();
        assert_eq!(range.min, 2.0);
        assert_relative_eq!(range.max, 2.0 + 1e-6);
        assert!(percentile_range(&band(vec![]), 2.0, 98.0).is_none());
    }
}
