//! Resampling of masked bands onto a reference grid.
//!
//! Values are interpolated bilinearly from the four surrounding pixel centres
//! and the validity mask is looked up with nearest neighbour. A destination
//! pixel is valid only when the nearest source pixel is valid and every
//! bilinear contributor with a non-zero weight is inside the source and
//! valid.

use gdal::spatial_ref::{AxisMappingStrategy, CoordTransform, SpatialRef};
use log::debug;
use rayon::prelude::*;

use crate::config::DEFAULT_NUM_THREADS;
use crate::error::{Result, S1Error};
use crate::readers::{GridDescriptor, MaskedBand};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignOptions {
    /// Worker threads used for resampling. Does not change results.
    pub num_threads: usize,
}

impl Default for AlignOptions {
    fn default() -> Self {
        Self {
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

/// Maps target CRS coordinates into source CRS coordinates in place.
pub trait PointTransform {
    fn transform(&self, xs: &mut [f64], ys: &mut [f64]) -> Result<()>;
}

/// Both grids share a CRS.
pub struct IdentityTransform;

impl PointTransform for IdentityTransform {
    fn transform(&self, _xs: &mut [f64], _ys: &mut [f64]) -> Result<()> {
        Ok(())
    }
}

/// GDAL/PROJ transformation between two CRSs in x/y (lon/lat) axis order.
pub struct CrsTransform {
    inner: CoordTransform,
}

impl CrsTransform {
    pub fn new(from_wkt: &str, to_wkt: &str) -> Result<Self> {
        let mut from = SpatialRef::from_wkt(from_wkt)?;
        let mut to = SpatialRef::from_wkt(to_wkt)?;
        from.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        to.set_axis_mapping_strategy(AxisMappingStrategy::TraditionalGisOrder);
        Ok(Self {
            inner: CoordTransform::new(&from, &to)?,
        })
    }
}

impl PointTransform for CrsTransform {
    /// Points outside the domain of either CRS come back as NaN, which makes
    /// the matching destination pixels invalid.
    fn transform(&self, xs: &mut [f64], ys: &mut [f64]) -> Result<()> {
        let (orig_xs, orig_ys) = (xs.to_vec(), ys.to_vec());
        let mut zs = vec![0.0; xs.len()];
        if self.inner.transform_coords(xs, ys, &mut zs).is_ok() {
            return Ok(());
        }

        // GDAL fails the whole batch when a single point fails.
        let mut failed = 0usize;
        for i in 0..xs.len() {
            let mut x = [orig_xs[i]];
            let mut y = [orig_ys[i]];
            let mut z = [0.0];
            match self.inner.transform_coords(&mut x, &mut y, &mut z) {
                Ok(()) if x[0].is_finite() && y[0].is_finite() => {
                    xs[i] = x[0];
                    ys[i] = y[0];
                }
                _ => {
                    xs[i] = f64::NAN;
                    ys[i] = f64::NAN;
                    failed += 1;
                }
            }
        }
        debug!("{} of {} points could not be reprojected", failed, xs.len());
        Ok(())
    }
}

/// Resamples `band` (on `source`) onto `target`.
///
/// Identical grids return the band unchanged.
pub fn align(
    band: &MaskedBand,
    source: &GridDescriptor,
    target: &GridDescriptor,
    options: &AlignOptions,
) -> Result<MaskedBand> {
    if source == target {
        return Ok(band.clone());
    }

    if source.crs_wkt == target.crs_wkt {
        debug!("Resampling within the same CRS");
        align_with(band, source, target, &IdentityTransform, options)
    } else if source.crs_wkt.is_empty() || target.crs_wkt.is_empty() {
        Err(S1Error::Reprojection(
            "cannot reproject between a georeferenced and an ungeoreferenced raster".to_string(),
        ))
    } else {
        debug!("Reprojecting between CRSs");
        let transform = CrsTransform::new(&target.crs_wkt, &source.crs_wkt)?;
        align_with(band, source, target, &transform, options)
    }
}

/// Resamples with an explicit target-to-source point transform.
pub fn align_with(
    band: &MaskedBand,
    source: &GridDescriptor,
    target: &GridDescriptor,
    transform: &dyn PointTransform,
    options: &AlignOptions,
) -> Result<MaskedBand> {
    if band.shape() != source.shape() {
        return Err(S1Error::ShapeMismatch {
            expected: source.shape(),
            actual: band.shape(),
        });
    }

    let (width, height) = target.shape();
    if width == 0 || height == 0 {
        return MaskedBand::new(width, height, Vec::new(), Vec::new());
    }

    let coords = source_pixel_coords(source, target, transform)?;
    let src_values = band.filled_values(f32::NAN);
    let src_valid = band.valid();
    let (src_width, src_height) = source.shape();

    let mut values = vec![f32::NAN; width * height];
    let mut valid = vec![false; width * height];

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.num_threads.max(1))
        .build()?;

    pool.install(|| {
        values
            .par_chunks_mut(width)
            .zip(valid.par_chunks_mut(width))
            .enumerate()
            .for_each(|(row, (value_row, valid_row))| {
                for col in 0..width {
                    let (px, py) = coords[row * width + col];
                    let value = bilinear(&src_values, src_width, src_height, px, py);
                    let nearest = nearest(src_valid, src_width, src_height, px, py);
                    value_row[col] = value;
                    valid_row[col] = nearest && value.is_finite();
                }
            });
    });

    MaskedBand::new(width, height, values, valid)
}

// Fractional source pixel coordinates of every destination pixel centre.
fn source_pixel_coords(
    source: &GridDescriptor,
    target: &GridDescriptor,
    transform: &dyn PointTransform,
) -> Result<Vec<(f64, f64)>> {
    let (width, height) = target.shape();
    let mut coords = Vec::with_capacity(width * height);
    let mut xs = vec![0.0; width];
    let mut ys = vec![0.0; width];

    for row in 0..height {
        for col in 0..width {
            (xs[col], ys[col]) = target.pixel_center(col, row);
        }
        transform.transform(&mut xs, &mut ys)?;
        for col in 0..width {
            let pixel = source.to_pixel(xs[col], ys[col]).ok_or_else(|| {
                S1Error::Reprojection("source geotransform is not invertible".to_string())
            })?;
            coords.push(pixel);
        }
    }

    Ok(coords)
}

fn bilinear(values: &[f32], width: usize, height: usize, px: f64, py: f64) -> f32 {
    if !px.is_finite() || !py.is_finite() {
        return f32::NAN;
    }

    // Interpolate between pixel centres.
    let (x0, fx) = split_snapped(px - 0.5);
    let (y0, fy) = split_snapped(py - 0.5);

    let neighbours = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1.0, y0, fx * (1.0 - fy)),
        (x0, y0 + 1.0, (1.0 - fx) * fy),
        (x0 + 1.0, y0 + 1.0, fx * fy),
    ];

    let mut acc = 0.0f64;
    for (x, y, weight) in neighbours {
        if weight <= 0.0 {
            continue;
        }
        if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
            return f32::NAN;
        }
        let v = values[y as usize * width + x as usize];
        if !v.is_finite() {
            return f32::NAN;
        }
        acc += weight * v as f64;
    }
    acc as f32
}

// Fractions this close to a pixel centre are round-off from the affine
// inversion and are snapped onto it.
const SNAP: f64 = 1e-9;

fn split_snapped(s: f64) -> (f64, f64) {
    let base = s.floor();
    let frac = s - base;
    if frac < SNAP {
        (base, 0.0)
    } else if frac > 1.0 - SNAP {
        (base + 1.0, 0.0)
    } else {
        (base, frac)
    }
}

fn nearest(valid: &[bool], width: usize, height: usize, px: f64, py: f64) -> bool {
    if !px.is_finite() || !py.is_finite() {
        return false;
    }
    let x = px.floor();
    let y = py.floor();
    if x < 0.0 || y < 0.0 || x >= width as f64 || y >= height as f64 {
        return false;
    }
    valid[y as usize * width + x as usize]
}
