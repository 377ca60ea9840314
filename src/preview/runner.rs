use std::path::{Path, PathBuf};

use log::{info, warn};

use super::{
    Colormap, DEFAULT_PCLIP, DEFAULT_SAMPLE_MAX, DisplayRange, Figure, SAMPLE_SEED, SAR_DB_LIMITS,
    percentile_range, robust_range, save_png, to_db,
};
use crate::bands::BandResolver;
use crate::error::Result;
use crate::readers::{GeoTiffReader, list_geotiffs};

/// Options of the batch VV/VH preview tool.
#[derive(Debug, Clone)]
pub struct PreviewOptions {
    pub folder: PathBuf,
    pub recursive: bool,
    pub outdir: Option<PathBuf>,
    pub pclip: (f64, f64),
    pub sample: usize,
    pub fixed_range: Option<(f64, f64)>,
    pub already_db: bool,
    pub colormap: Colormap,
    pub dpi: u32,
}

impl PreviewOptions {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            recursive: false,
            outdir: None,
            pclip: DEFAULT_PCLIP,
            sample: DEFAULT_SAMPLE_MAX,
            fixed_range: None,
            already_db: false,
            colormap: Colormap::default(),
            dpi: 180,
        }
    }

    /// `--outdir`, or `<folder>/png`.
    pub fn output_root(&self) -> PathBuf {
        self.outdir.clone().unwrap_or_else(|| self.folder.join("png"))
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Writes `<root>/<stem>/<stem>_<POL>_dB.png` for every VV/VH band found in
/// the folder. Returns the PNGs written.
pub fn run_batch(options: &PreviewOptions) -> Result<Vec<PathBuf>> {
    let files = list_geotiffs(&options.folder, options.recursive);
    if files.is_empty() {
        warn!("No GeoTIFFs found under {}", options.folder.display());
        return Ok(Vec::new());
    }

    let root = options.output_root();
    info!("Found {} file(s). Writing PNGs under: {}", files.len(), root.display());

    let resolver = BandResolver::default();
    let mut written = Vec::new();

    for path in &files {
        let reader = GeoTiffReader::open(path)?;
        let name = reader.file_name();
        let stem = file_stem(path);

        for (polarization, band_index) in resolver
            .resolve(reader.dataset(), &name)
            .present(reader.band_count())
        {
            let band = reader.read_masked(band_index)?;
            let data = if options.already_db { band } else { to_db(&band) };

            let range = match options.fixed_range {
                Some((min, max)) => DisplayRange::new(min, max),
                None => {
                    let (low, high) = options.pclip;
                    match robust_range(&data, low, high, Some(options.sample), SAMPLE_SEED) {
                        Some(range) => range.clamp_to(SAR_DB_LIMITS, 0.1),
                        None => {
                            warn!("[SKIP] {} {}: no valid data.", name, polarization);
                            continue;
                        }
                    }
                }
            };

            let figure = Figure {
                title: format!("{} - {}", name, polarization),
                unit_label: "Backscatter (dB)".to_string(),
                range,
                colormap: options.colormap,
                dpi: options.dpi,
            };
            let out = root
                .join(&stem)
                .join(format!("{}_{}_dB.png", stem, polarization));
            save_png(&data, &figure, &out)?;
            info!("[OK] {}  (dB range {:.2}..{:.2})", out.display(), range.min, range.max);
            written.push(out);
        }
    }

    Ok(written)
}

/// Options of the single-file preview tool.
#[derive(Debug, Clone)]
pub struct SingleOptions {
    pub tif: PathBuf,
    pub out: Option<PathBuf>,
    pub db: bool,
    pub pclip: (f64, f64),
    pub fixed_range: Option<(f64, f64)>,
    pub colormap: Colormap,
    pub dpi: u32,
}

impl SingleOptions {
    pub fn new(tif: impl Into<PathBuf>) -> Self {
        Self {
            tif: tif.into(),
            out: None,
            db: false,
            pclip: DEFAULT_PCLIP,
            fixed_range: None,
            colormap: Colormap::default(),
            dpi: 180,
        }
    }

    /// `--out`, or the input path with a `.png` extension.
    pub fn output_path(&self) -> PathBuf {
        self.out
            .clone()
            .unwrap_or_else(|| self.tif.with_extension("png"))
    }
}

/// Renders band 1 of one raster. Returns `None` when it holds no valid data.
pub fn run_single(options: &SingleOptions) -> Result<Option<PathBuf>> {
    let reader = GeoTiffReader::open(&options.tif)?;
    let band = reader.read_masked(1)?;
    let data = if options.db { to_db(&band) } else { band };

    let range = match options.fixed_range {
        Some((min, max)) => DisplayRange::new(min, max),
        None => match percentile_range(&data, options.pclip.0, options.pclip.1) {
            Some(range) => range,
            None => {
                warn!("No valid data to plot in {}", options.tif.display());
                return Ok(None);
            }
        },
    };

    let figure = Figure {
        title: file_stem(&options.tif),
        unit_label: if options.db { "Value (dB)" } else { "Value" }.to_string(),
        range,
        colormap: options.colormap,
        dpi: options.dpi,
    };
    let out = options.output_path();
    save_png(&data, &figure, &out)?;
    info!("[OK] {}  range={:.4}..{:.4}", out.display(), range.min, range.max);
    Ok(Some(out))
}
