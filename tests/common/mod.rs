#![allow(dead_code)]

use std::path::Path;

use gdal::raster::Buffer;
use gdal::spatial_ref::SpatialRef;
use gdal::{DriverManager, Metadata};

pub const NODATA: f64 = -9999.0;

/// UTM 33N, a typical Sentinel-1 GRD output CRS.
pub fn utm_wkt() -> String {
    SpatialRef::from_epsg(32633)
        .and_then(|srs| srs.to_wkt())
        .expect("EPSG:32633")
}

/// Geographic WGS 84.
pub fn wgs84_wkt() -> String {
    SpatialRef::from_epsg(4326)
        .and_then(|srs| srs.to_wkt())
        .expect("EPSG:4326")
}

/// One band of a fixture: optional description and its pixels.
pub struct FixtureBand<'a> {
    pub description: Option<&'a str>,
    pub values: Vec<f32>,
}

impl<'a> FixtureBand<'a> {
    pub fn described(description: &'a str, values: Vec<f32>) -> Self {
        Self {
            description: Some(description),
            values,
        }
    }

    pub fn plain(values: Vec<f32>) -> Self {
        Self {
            description: None,
            values,
        }
    }
}

/// Writes a float32 GeoTIFF in UTM 33N with square 1-unit pixels whose
/// top-left corner is at (origin_x, origin_y).
pub fn write_fixture(
    path: &Path,
    width: usize,
    height: usize,
    origin: (f64, f64),
    bands: &[FixtureBand],
) {
    let geo_transform = [origin.0, 1.0, 0.0, origin.1, 0.0, -1.0];
    write_fixture_in(path, width, height, geo_transform, &utm_wkt(), bands);
}

/// Writes a float32 GeoTIFF with an explicit geotransform and CRS.
pub fn write_fixture_in(
    path: &Path,
    width: usize,
    height: usize,
    geo_transform: [f64; 6],
    crs_wkt: &str,
    bands: &[FixtureBand],
) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut dataset = driver
        .create_with_band_type::<f32, _>(path, width, height, bands.len())
        .unwrap();
    dataset.set_geo_transform(&geo_transform).unwrap();
    dataset.set_projection(crs_wkt).unwrap();

    for (i, fixture) in bands.iter().enumerate() {
        let mut band = dataset.rasterband(i + 1).unwrap();
        band.set_no_data_value(Some(NODATA)).unwrap();
        if let Some(description) = fixture.description {
            band.set_description(description).unwrap();
        }
        let mut buffer = Buffer::new((width, height), fixture.values.clone());
        band.write((0, 0), (width, height), &mut buffer).unwrap();
    }
}

/// Band 1 of a raster as plain values.
pub fn read_values(path: &Path) -> Vec<f32> {
    let dataset = gdal::Dataset::open(path).unwrap();
    let band = dataset.rasterband(1).unwrap();
    let (width, height) = dataset.raster_size();
    band.read_as::<f32>((0, 0), (width, height), (width, height), None)
        .unwrap()
        .data()
        .to_vec()
}
