use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use super::accumulator::{Accumulator, AveragedBand};
use crate::acq_date::{TemporalGroup, group_for_name};
use crate::align::{AlignOptions, align};
use crate::bands::{BandResolver, Polarization};
use crate::config::Config;
use crate::error::Result;
use crate::readers::{GeoTiffReader, GridDescriptor, list_geotiffs};
use crate::writer::write_geotiff;

#[derive(Debug, Clone)]
pub struct AverageOptions {
    pub folder: PathBuf,
    pub recursive: bool,
    pub outdir: Option<PathBuf>,
}

impl AverageOptions {
    /// `--outdir`, or `<folder>/averages`.
    pub fn output_dir(&self) -> PathBuf {
        self.outdir
            .clone()
            .unwrap_or_else(|| self.folder.join("averages"))
    }
}

/// One average raster written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenAverage {
    pub path: PathBuf,
    pub group: TemporalGroup,
    pub polarization: Polarization,
    pub contributing_files: usize,
    pub valid_pixels: usize,
}

/// `VV_before.tiff`, `VH_after.tiff`, ...
pub fn output_name(polarization: Polarization, group: TemporalGroup) -> String {
    format!("{}_{}.tiff", polarization, group)
}

/// Averages every VV/VH band of the GeoTIFFs in `options.folder` before and
/// after the configured threshold date.
///
/// The first dated file defines the reference grid; later files are
/// resampled onto it before they are accumulated.
pub fn run_average(options: &AverageOptions, config: &Config) -> Result<Vec<WrittenAverage>> {
    let files = list_geotiffs(&options.folder, options.recursive);
    if files.is_empty() {
        warn!("No GeoTIFFs found under {}", options.folder.display());
        return Ok(Vec::new());
    }
    info!("Found {} GeoTIFF(s) under {}", files.len(), options.folder.display());

    let resolver = BandResolver::default();
    let align_options = AlignOptions {
        num_threads: config.num_threads(),
    };
    let mut reference: Option<GridDescriptor> = None;
    let mut accumulator: Option<Accumulator> = None;

    for path in &files {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let Some((date, group)) = group_for_name(&name, config.threshold_date()) else {
            warn!("Skipping (no date in name): {}", name);
            continue;
        };

        let reader = GeoTiffReader::open(path)?;

        let grid = reader.grid();
        let reference = reference.get_or_insert_with(|| grid.clone());
        let accumulator =
            accumulator.get_or_insert_with(|| Accumulator::new(reference.width, reference.height));

        let present = resolver
            .resolve(reader.dataset(), &name)
            .present(reader.band_count());
        if present.is_empty() {
            warn!("Skipping {}: no VV or VH band identified", name);
            continue;
        }

        for (polarization, band_index) in present {
            let band = reader.read_masked(band_index)?;
            let aligned = align(&band, &grid, reference, &align_options)?;
            debug!(
                "{} ({}, {}): {} band {} -> {} valid pixels",
                name,
                date,
                group,
                polarization,
                band_index,
                aligned.valid_count()
            );
            accumulator.add(group, polarization, &aligned)?;
        }
    }

    let (Some(reference), Some(accumulator)) = (reference, accumulator) else {
        warn!("No dated GeoTIFFs found; nothing to average");
        return Ok(Vec::new());
    };

    let averages = accumulator.finalize(config.nodata());
    log_missing(&averages);

    let outdir = options.output_dir();
    averages
        .into_iter()
        .map(|average| write_average(&outdir, average, &reference, config))
        .collect()
}

fn write_average(
    outdir: &Path,
    average: AveragedBand,
    reference: &GridDescriptor,
    config: &Config,
) -> Result<WrittenAverage> {
    let path = outdir.join(output_name(average.polarization, average.group));
    write_geotiff(&path, &average.values, reference, config)?;
    info!(
        "[OK] {}  (contributing images: {}, valid pixels: {})",
        path.display(),
        average.contributing_files,
        average.valid_pixels
    );
    Ok(WrittenAverage {
        path,
        group: average.group,
        polarization: average.polarization,
        contributing_files: average.contributing_files,
        valid_pixels: average.valid_pixels,
    })
}

fn log_missing(averages: &[AveragedBand]) {
    for group in TemporalGroup::ALL {
        for polarization in Polarization::ALL {
            let found = averages
                .iter()
                .any(|a| a.group == group && a.polarization == polarization);
            if !found {
                info!(
                    "No data for {} {}; skipping {}",
                    polarization,
                    group,
                    output_name(polarization, group)
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_names() {
        assert_eq!(output_name(Polarization::VV, TemporalGroup::Before), "VV_before.tiff");
        assert_eq!(output_name(Polarization::VH, TemporalGroup::After), "VH_after.tiff");
    }

    #[test]
    fn test_default_output_dir() {
        let options = AverageOptions {
            folder: PathBuf::from("/data/s1"),
            recursive: false,
            outdir: None,
        };
        assert_eq!(options.output_dir(), PathBuf::from("/data/s1/averages"));
    }
}
