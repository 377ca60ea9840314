use std::path::PathBuf;

use clap::Parser;
use log::info;

use s1burn::preview::{Colormap, DEFAULT_SAMPLE_MAX, MIN_DPI, PreviewOptions, run_batch};

#[derive(Parser, Debug)]
#[command(name = "s1_preview")]
#[command(about = "Render Sentinel-1 VV/VH bands as PNGs with a dB colour scale")]
#[command(version)]
struct Args {
    /// Folder with Sentinel-1 GeoTIFFs
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Search subfolders too
    #[arg(long)]
    recursive: bool,

    /// Output root (default: <FOLDER>/png)
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Percentile clip for the dB stretch (ignored with --fixed-range)
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], default_values_t = [2.0, 98.0])]
    pclip: Vec<f64>,

    /// Maximum number of pixels sampled for percentiles
    #[arg(long, value_name = "N", default_value_t = DEFAULT_SAMPLE_MAX)]
    sample: usize,

    /// Fixed dB range for a consistent colour scale across images
    #[arg(long, num_args = 2, value_names = ["MIN_DB", "MAX_DB"], allow_negative_numbers = true)]
    fixed_range: Option<Vec<f64>>,

    /// Data are already in dB; skip the conversion
    #[arg(long)]
    already_db: bool,

    /// Colormap: gray, viridis, magma, inferno, plasma, cividis (append _r to reverse)
    #[arg(long, value_name = "NAME", default_value = "gray")]
    cmap: Colormap,

    /// PNG resolution
    #[arg(long, value_name = "N", default_value_t = 180, value_parser = clap::value_parser!(u32).range(MIN_DPI as i64..))]
    dpi: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> s1burn::Result<()> {
    let args = Args::parse();
    s1burn::init_logging(args.verbose);

    let options = PreviewOptions {
        folder: args.folder,
        recursive: args.recursive,
        outdir: args.outdir,
        pclip: (args.pclip[0], args.pclip[1]),
        sample: args.sample,
        fixed_range: args.fixed_range.map(|r| (r[0], r[1])),
        already_db: args.already_db,
        colormap: args.cmap,
        dpi: args.dpi,
    };
    let written = run_batch(&options)?;
    info!("Done. {} PNG(s) written.", written.len());
    Ok(())
}
