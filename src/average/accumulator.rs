use std::collections::BTreeMap;

use log::warn;

use crate::acq_date::TemporalGroup;
use crate::bands::Polarization;
use crate::error::{Result, S1Error};
use crate::readers::MaskedBand;

/// Running sum and valid-pixel count for one (group, polarization).
#[derive(Debug, Clone)]
struct SumGrid {
    sum: Vec<f64>,
    count: Vec<u32>,
    files: usize,
}

impl SumGrid {
    fn new(len: usize) -> Self {
        Self {
            sum: vec![0.0; len],
            count: vec![0; len],
            files: 0,
        }
    }
}

/// Mean of one (group, polarization) over all contributing files.
#[derive(Debug, Clone)]
pub struct AveragedBand {
    pub group: TemporalGroup,
    pub polarization: Polarization,
    /// Mean where at least one file was valid, the no-data value elsewhere.
    pub values: Vec<f32>,
    pub contributing_files: usize,
    pub valid_pixels: usize,
}

/// Per-pixel mean over a file set split into temporal groups.
///
/// All bands must already be aligned to one grid of `width` x `height`.
/// Grids are allocated on the first contribution of each combination.
#[derive(Debug, Clone)]
pub struct Accumulator {
    width: usize,
    height: usize,
    grids: BTreeMap<(TemporalGroup, Polarization), SumGrid>,
}

impl Accumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grids: BTreeMap::new(),
        }
    }

    pub fn add(&mut self, group: TemporalGroup, polarization: Polarization, band: &MaskedBand) -> Result<()> {
        if band.shape() != (self.width, self.height) {
            return Err(S1Error::ShapeMismatch {
                expected: (self.width, self.height),
                actual: band.shape(),
            });
        }

        let len = self.width * self.height;
        let grid = self
            .grids
            .entry((group, polarization))
            .or_insert_with(|| SumGrid::new(len));

        for (i, (value, ok)) in band.values().iter().zip(band.valid()).enumerate() {
            if *ok {
                grid.sum[i] += *value as f64;
                grid.count[i] += 1;
            }
        }
        grid.files += 1;
        Ok(())
    }

    /// Number of files added for a combination so far.
    pub fn contributing_files(&self, group: TemporalGroup, polarization: Polarization) -> usize {
        self.grids
            .get(&(group, polarization))
            .map_or(0, |grid| grid.files)
    }

    /// Divides sums by counts. Combinations without any valid pixel are
    /// dropped with a warning.
    pub fn finalize(self, nodata: f64) -> Vec<AveragedBand> {
        let fill = nodata as f32;
        let mut results = Vec::new();

        for ((group, polarization), grid) in self.grids {
            let valid_pixels = grid.count.iter().filter(|c| **c > 0).count();
            if valid_pixels == 0 {
                warn!("No valid pixels for {} {}; skipping", polarization, group);
                continue;
            }

            let values = grid
                .sum
                .iter()
                .zip(&grid.count)
                .map(|(sum, count)| {
                    if *count > 0 {
                        (sum / *count as f64) as f32
                    } else {
                        fill
                    }
                })
                .collect();

            results.push(AveragedBand {
                group,
                polarization,
                values,
                contributing_files: grid.files,
                valid_pixels,
            });
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn band(values: Vec<f32>, valid: Vec<bool>) -> MaskedBand {
        MaskedBand::new(2, 2, values, valid).unwrap()
    }

    #[test]
    fn test_single_file_mean_is_exact() {
        let mut acc = Accumulator::new(2, 2);
        let input = band(vec![0.1, 0.2, 0.3, 7.7], vec![true, true, false, true]);
        acc.add(TemporalGroup::Before, Polarization::VV, &input).unwrap();

        let results = acc.finalize(-9999.0);
        assert_eq!(results.len(), 1);
        let vv = &results[0];
        assert_eq!(vv.values, vec![0.1, 0.2, -9999.0, 7.7]);
        assert_eq!(vv.contributing_files, 1);
        assert_eq!(vv.valid_pixels, 3);
    }

    #[test]
    fn test_mean_uses_per_pixel_counts() {
        let mut acc = Accumulator::new(2, 2);
        let a = band(vec![1.0, 2.0, 3.0, 4.0], vec![true, true, true, false]);
        let b = band(vec![3.0, 4.0, 0.0, 0.0], vec![true, true, false, false]);
        acc.add(TemporalGroup::After, Polarization::VH, &a).unwrap();
        acc.add(TemporalGroup::After, Polarization::VH, &b).unwrap();

        let results = acc.finalize(-1.0);
        assert_eq!(results[0].values, vec![2.0, 3.0, 3.0, -1.0]);
        assert_eq!(results[0].contributing_files, 2);
        assert_eq!(results[0].valid_pixels, 3);
    }

    #[test]
    fn test_order_does_not_matter() {
        let a = band(vec![1.0, 5.0, 9.0, 2.0], vec![true; 4]);
        let b = band(vec![4.0, 0.5, 1.0, 8.0], vec![true, false, true, true]);

        let mut forward = Accumulator::new(2, 2);
        forward.add(TemporalGroup::Before, Polarization::VV, &a).unwrap();
        forward.add(TemporalGroup::Before, Polarization::VV, &b).unwrap();

        let mut backward = Accumulator::new(2, 2);
        backward.add(TemporalGroup::Before, Polarization::VV, &b).unwrap();
        backward.add(TemporalGroup::Before, Polarization::VV, &a).unwrap();

        assert_eq!(
            forward.finalize(-9999.0)[0].values,
            backward.finalize(-9999.0)[0].values
        );
    }

    #[test]
    fn test_output_order_and_empty_combinations() {
        let mut acc = Accumulator::new(2, 2);
        let full = band(vec![1.0; 4], vec![true; 4]);
        let empty = band(vec![1.0; 4], vec![false; 4]);
        acc.add(TemporalGroup::After, Polarization::VV, &full).unwrap();
        acc.add(TemporalGroup::Before, Polarization::VH, &full).unwrap();
        acc.add(TemporalGroup::Before, Polarization::VV, &full).unwrap();
        acc.add(TemporalGroup::After, Polarization::VH, &empty).unwrap();
        assert_eq!(acc.contributing_files(TemporalGroup::After, Polarization::VH), 1);

        let keys: Vec<_> = acc
            .finalize(-9999.0)
            .into_iter()
            .map(|b| (b.group, b.polarization))
            .collect();
        assert_eq!(
            keys,
            vec![
                (TemporalGroup::Before, Polarization::VV),
                (TemporalGroup::Before, Polarization::VH),
                (TemporalGroup::After, Polarization::VV),
            ]
        );
    }

    #[test]
    fn test_shape_mismatch() {
        let mut acc = Accumulator::new(3, 3);
        let result = acc.add(
            TemporalGroup::Before,
            Polarization::VV,
            &band(vec![1.0; 4], vec![true; 4]),
        );
        assert!(result.is_err());
        assert_eq!(acc.contributing_files(TemporalGroup::Before, Polarization::VV), 0);
    }
}
