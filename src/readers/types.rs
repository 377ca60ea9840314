use std::fmt;

use crate::error::{Result, S1Error};

/// A single raster band together with its validity mask.
///
/// `values` and `valid` are row-major and always have `width * height`
/// elements. A pixel is valid when it holds a finite value that is not the
/// source's no-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskedBand {
    width: usize,
    height: usize,
    values: Vec<f32>,
    valid: Vec<bool>,
}

impl MaskedBand {
    pub fn new(width: usize, height: usize, values: Vec<f32>, valid: Vec<bool>) -> Result<Self> {
        let expected = width * height;
        if values.len() != expected || valid.len() != expected {
            return Err(S1Error::ShapeMismatch {
                expected: (width, height),
                actual: (values.len(), valid.len()),
            });
        }
        Ok(Self {
            width,
            height,
            values,
            valid,
        })
    }

    /// Builds the validity mask from raw values and an optional declared
    /// no-data value. A NaN no-data counts as "not declared".
    pub fn from_raw(width: usize, height: usize, values: Vec<f32>, nodata: Option<f64>) -> Result<Self> {
        let sentinel = nodata.filter(|nd| !nd.is_nan()).map(|nd| nd as f32);
        let valid = values
            .iter()
            .map(|v| v.is_finite() && sentinel.is_none_or(|nd| *v != nd))
            .collect();
        Self::new(width, height, values, valid)
    }

    /// A fully valid band holding `value` everywhere.
    pub fn filled(width: usize, height: usize, value: f32) -> Self {
        Self {
            width,
            height,
            values: vec![value; width * height],
            valid: vec![value.is_finite(); width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    /// Value at row-major index `i` if that pixel is valid.
    pub fn get(&self, i: usize) -> Option<f32> {
        if self.valid[i] {
            Some(self.values[i])
        } else {
            None
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.iter().filter(|v| **v).count()
    }

    pub fn valid_values(&self) -> Vec<f32> {
        self.values
            .iter()
            .zip(&self.valid)
            .filter_map(|(v, ok)| ok.then_some(*v))
            .collect()
    }

    /// Values with invalid pixels replaced by `fill`.
    pub fn filled_values(&self, fill: f32) -> Vec<f32> {
        self.values
            .iter()
            .zip(&self.valid)
            .map(|(v, ok)| if *ok { *v } else { fill })
            .collect()
    }

    /// Applies `f` to every valid pixel. Pixels where `f` yields a
    /// non-finite value become invalid.
    pub fn map_valid<F>(&self, f: F) -> MaskedBand
    where
        F: Fn(f32) -> f32,
    {
        let mut values = self.values.clone();
        let mut valid = self.valid.clone();
        for (v, ok) in values.iter_mut().zip(valid.iter_mut()) {
            if *ok {
                *v = f(*v);
                *ok = v.is_finite();
            }
        }
        MaskedBand {
            width: self.width,
            height: self.height,
            values,
            valid,
        }
    }
}

impl fmt::Display for MaskedBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.valid_values();
        let min_value = valid.iter().copied().fold(f32::NAN, f32::min);
        let max_value = valid.iter().copied().fold(f32::NAN, f32::max);

        write!(
            f,
            "Width: {}\nHeight: {}\nValid pixels: {} / {}\nMin value: {}\nMax value: {}",
            self.width,
            self.height,
            valid.len(),
            self.values.len(),
            min_value,
            max_value,
        )
    }
}

/// Georeferencing of a raster: CRS, affine transform and size.
///
/// Two grids are compatible only when all four fields are equal.
#[derive(Debug, Clone, PartialEq)]
pub struct GridDescriptor {
    pub crs_wkt: String,
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
}

impl GridDescriptor {
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Map coordinates of the centre of pixel (`col`, `row`).
    pub fn pixel_center(&self, col: usize, row: usize) -> (f64, f64) {
        let gt = &self.geo_transform;
        let px = col as f64 + 0.5;
        let py = row as f64 + 0.5;
        (
            gt[0] + px * gt[1] + py * gt[2],
            gt[3] + px * gt[4] + py * gt[5],
        )
    }

    /// Fractional pixel coordinates of map point (`x`, `y`), or `None` if the
    /// transform cannot be inverted.
    pub fn to_pixel(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let gt = &self.geo_transform;
        let det = gt[1] * gt[5] - gt[2] * gt[4];
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let dx = x - gt[0];
        let dy = y - gt[3];
        Some(((gt[5] * dx - gt[2] * dy) / det, (gt[1] * dy - gt[4] * dx) / det))
    }
}
