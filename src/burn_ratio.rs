//! Relative burn ratio of a before/after SAR pair.
//!
//! `RBR = (after - before) / (after + before + eps)`, evaluated in linear
//! power units.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::align::{AlignOptions, align};
use crate::bands::{BandResolver, Polarization};
use crate::config::Config;
use crate::error::{Result, S1Error};
use crate::readers::{GeoTiffReader, MaskedBand};
use crate::stats::{Summary, summarize};
use crate::writer::write_geotiff;

/// dB to linear power, `10^(dB/10)`.
pub fn to_linear(band: &MaskedBand) -> MaskedBand {
    band.map_valid(|db| 10f32.powf(db / 10.0))
}

/// Burn ratio of two bands on the same grid.
///
/// Valid where both inputs are valid and the ratio is finite.
pub fn burn_ratio(before: &MaskedBand, after: &MaskedBand, epsilon: f64) -> Result<MaskedBand> {
    if before.shape() != after.shape() {
        return Err(S1Error::ShapeMismatch {
            expected: before.shape(),
            actual: after.shape(),
        });
    }

    let (width, height) = before.shape();
    let mut values = vec![f32::NAN; before.len()];
    let mut valid = vec![false; before.len()];

    for i in 0..before.len() {
        let (Some(b), Some(a)) = (before.get(i), after.get(i)) else {
            continue;
        };
        let (b, a) = (b as f64, a as f64);
        let ratio = ((a - b) / (a + b + epsilon)) as f32;
        values[i] = ratio;
        valid[i] = ratio.is_finite();
    }

    MaskedBand::new(width, height, values, valid)
}

#[derive(Debug, Clone)]
pub struct BurnRatioOptions {
    pub before: PathBuf,
    pub after: PathBuf,
    pub inputs_in_db: bool,
    pub outdir: Option<PathBuf>,
}

impl BurnRatioOptions {
    /// `--outdir`, or the folder holding the AFTER raster.
    pub fn output_dir(&self) -> PathBuf {
        self.outdir.clone().unwrap_or_else(|| {
            self.after
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct WrittenRatio {
    pub path: PathBuf,
    pub polarization: Polarization,
    pub summary: Option<Summary>,
}

/// Computes `RBR_<POL>.tiff` for every polarization found in both inputs.
///
/// The BEFORE raster defines the output grid.
pub fn run_burn_ratio(options: &BurnRatioOptions, config: &Config) -> Result<Vec<WrittenRatio>> {
    let before = GeoTiffReader::open(&options.before)?;
    let after = GeoTiffReader::open(&options.after)?;

    let resolver = BandResolver::default();
    let pol_before = resolver.resolve(before.dataset(), &before.file_name());
    let pol_after = resolver.resolve(after.dataset(), &after.file_name());

    let mut available = Vec::new();
    for polarization in Polarization::ALL {
        let b = pol_before
            .get(polarization)
            .filter(|band| *band <= before.band_count());
        let a = pol_after
            .get(polarization)
            .filter(|band| *band <= after.band_count());
        match (b, a) {
            (Some(b), Some(a)) => available.push((polarization, b, a)),
            _ => info!("Skipping {}: not present in both inputs", polarization),
        }
    }
    if available.is_empty() {
        return Err(S1Error::NoCommonPolarization);
    }

    let reference = before.grid();
    let after_grid = after.grid();
    let align_options = AlignOptions {
        num_threads: config.num_threads(),
    };
    let outdir = options.output_dir();
    let mut written = Vec::new();

    for (polarization, b_idx, a_idx) in available {
        let mut b_band = before.read_masked(b_idx)?;
        let mut a_band = align(&after.read_masked(a_idx)?, &after_grid, &reference, &align_options)?;

        if options.inputs_in_db {
            b_band = to_linear(&b_band);
            a_band = to_linear(&a_band);
        }

        let ratio = burn_ratio(&b_band, &a_band, config.epsilon())?;
        let path = outdir.join(format!("RBR_{}.tiff", polarization));
        write_geotiff(&path, &ratio.filled_values(config.nodata() as f32), &reference, config)?;

        let summary = summarize(&ratio.valid_values());
        match &summary {
            Some(s) => info!(
                "[OK] {}  min={:.4}  p5={:.4}  med={:.4}  p95={:.4}  max={:.4}  n={}",
                path.display(),
                s.min,
                s.p5,
                s.median,
                s.p95,
                s.max,
                s.count
            ),
            None => warn!("[OK] {}  (no valid pixels)", path.display()),
        }

        written.push(WrittenRatio {
            path,
            polarization,
            summary,
        });
    }

    Ok(written)
}
