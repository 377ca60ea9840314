use std::path::PathBuf;

use clap::Parser;
use log::info;

use s1burn::average::{AverageOptions, run_average};
use s1burn::config::{Config, parse_date};

#[derive(Parser, Debug)]
#[command(name = "s1_average")]
#[command(about = "Average Sentinel-1 VV/VH GeoTIFFs before and after a threshold date")]
#[command(version)]
struct Args {
    /// Folder with Sentinel-1 GeoTIFFs
    #[arg(value_name = "FOLDER")]
    folder: PathBuf,

    /// Search subfolders too
    #[arg(long)]
    recursive: bool,

    /// Output folder (default: <FOLDER>/averages)
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Threshold date; acquisitions on or after it are "after"
    #[arg(long, value_name = "YYYY-MM-DD")]
    threshold: Option<String>,

    /// JSON configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> s1burn::Result<()> {
    let args = Args::parse();
    s1burn::init_logging(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(raw) = &args.threshold {
        config = config.with_threshold_date(parse_date(raw)?);
    }
    info!("Threshold date: {}", config.threshold_date());

    let options = AverageOptions {
        folder: args.folder,
        recursive: args.recursive,
        outdir: args.outdir,
    };
    let written = run_average(&options, &config)?;
    info!("Wrote {} average raster(s) to {}", written.len(), options.output_dir().display());
    Ok(())
}
