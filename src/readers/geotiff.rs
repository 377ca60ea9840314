use super::{GridDescriptor, MaskedBand};
use crate::error::{Result, S1Error};
use gdal::Dataset;
use log::debug;
use std::path::{Path, PathBuf};

// Pixel-space transform assumed for rasters without georeferencing.
const IDENTITY_TRANSFORM: [f64; 6] = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];

/// An open GeoTIFF (or any GDAL raster) with its path kept for diagnostics.
pub struct GeoTiffReader {
    path: PathBuf,
    dataset: Dataset,
}

impl GeoTiffReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let dataset = Dataset::open(&path)?;
        debug!(
            "Opened {} ({} bands, {}x{})",
            path.display(),
            dataset.raster_count(),
            dataset.raster_size().0,
            dataset.raster_size().1
        );
        Ok(Self { path, dataset })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File name used by the filename-based heuristics.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn band_count(&self) -> usize {
        self.dataset.raster_count()
    }

    pub fn grid(&self) -> GridDescriptor {
        let (width, height) = self.dataset.raster_size();
        GridDescriptor {
            crs_wkt: self.dataset.projection(),
            geo_transform: self.dataset.geo_transform().unwrap_or(IDENTITY_TRANSFORM),
            width,
            height,
        }
    }

    /// Reads 1-based `band_index` as a masked band honoring the declared
    /// no-data value and non-finite pixels.
    pub fn read_masked(&self, band_index: usize) -> Result<MaskedBand> {
        let count = self.band_count();
        if band_index == 0 || band_index > count {
            return Err(S1Error::InvalidBand {
                path: self.path.clone(),
                band: band_index,
                count,
            });
        }

        let band = self.dataset.rasterband(band_index)?;
        let (width, height) = self.dataset.raster_size();
        let buffer = band.read_as::<f32>((0, 0), (width, height), (width, height), None)?;
        let values: Vec<f32> = buffer.data().to_vec();

        MaskedBand::from_raw(width, height, values, band.no_data_value())
    }
}
