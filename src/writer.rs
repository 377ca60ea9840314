use crate::config::Config;
use crate::error::{Result, S1Error};
use crate::readers::GridDescriptor;
use gdal::DriverManager;
use gdal::cpl::CslStringList;
use gdal::raster::Buffer;
use log::debug;
use std::fs;
use std::path::Path;

/// Creation options for tiled, compressed single-band outputs.
pub fn creation_options(compression: &str, tile_size: usize) -> Result<CslStringList> {
    let mut options = CslStringList::new();
    options.set_name_value("COMPRESS", compression)?;
    options.set_name_value("TILED", "YES")?;
    options.set_name_value("BLOCKXSIZE", &tile_size.to_string())?;
    options.set_name_value("BLOCKYSIZE", &tile_size.to_string())?;
    Ok(options)
}

/// Writes `values` as a single-band float32 GeoTIFF on `grid`.
///
/// Parent directories are created; `config` supplies the no-data value and
/// the creation options.
pub fn write_geotiff(path: &Path, values: &[f32], grid: &GridDescriptor, config: &Config) -> Result<()> {
    if values.len() != grid.width * grid.height {
        return Err(S1Error::ShapeMismatch {
            expected: grid.shape(),
            actual: (values.len(), 1),
        });
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options = creation_options(config.compression(), config.tile_size())?;
    let mut dataset = driver.create_with_band_type_with_options::<f32, _>(
        path,
        grid.width,
        grid.height,
        1,
        &options,
    )?;

    dataset.set_geo_transform(&grid.geo_transform)?;
    if !grid.crs_wkt.is_empty() {
        dataset.set_projection(&grid.crs_wkt)?;
    }

    let mut band = dataset.rasterband(1)?;
    band.set_no_data_value(Some(config.nodata()))?;
    let mut buffer = Buffer::new((grid.width, grid.height), values.to_vec());
    band.write((0, 0), (grid.width, grid.height), &mut buffer)?;

    debug!("Wrote {} ({}x{})", path.display(), grid.width, grid.height);
    Ok(())
}
