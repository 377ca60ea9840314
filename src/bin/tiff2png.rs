use std::path::PathBuf;

use clap::Parser;

use s1burn::preview::{Colormap, MIN_DPI, SingleOptions, run_single};

#[derive(Parser, Debug)]
#[command(name = "tiff2png")]
#[command(about = "Plot band 1 of a GeoTIFF as a PNG with a colour bar")]
#[command(version)]
struct Args {
    /// Input GeoTIFF
    #[arg(value_name = "TIF")]
    tif: PathBuf,

    /// Output PNG (default: input path with .png)
    #[arg(long, value_name = "PATH")]
    out: Option<PathBuf>,

    /// Convert values to dB (10*log10) first
    #[arg(long)]
    db: bool,

    /// Percentile clip for the display stretch
    #[arg(long, num_args = 2, value_names = ["LOW", "HIGH"], default_values_t = [2.0, 98.0])]
    pclip: Vec<f64>,

    /// Fixed display range; skips the percentile stretch
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_negative_numbers = true)]
    fixed_range: Option<Vec<f64>>,

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

    let options = SingleOptions {
        tif: args.tif,
        out: args.out,
        db: args.db,
        pclip: (args.pclip[0], args.pclip[1]),
        fixed_range: args.fixed_range.map(|r| (r[0], r[1])),
        colormap: args.cmap,
        dpi: args.dpi,
    };
    run_single(&options)?;
    Ok(())
}
