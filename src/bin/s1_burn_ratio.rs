use std::path::PathBuf;

use clap::Parser;
use log::info;

use s1burn::burn_ratio::{BurnRatioOptions, run_burn_ratio};
use s1burn::config::Config;

#[derive(Parser, Debug)]
#[command(name = "s1_burn_ratio")]
#[command(about = "Relative burn ratio (after - before) / (after + before) per polarization")]
#[command(version)]
struct Args {
    /// BEFORE raster; defines the output grid
    #[arg(value_name = "BEFORE")]
    before: PathBuf,

    /// AFTER raster; resampled onto the BEFORE grid when needed
    #[arg(value_name = "AFTER")]
    after: PathBuf,

    /// Inputs are in dB and are converted to linear power first
    #[arg(long)]
    inputs_in_db: bool,

    /// Output folder (default: folder of AFTER)
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,

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

    let config = Config::load(args.config.as_deref())?;
    let options = BurnRatioOptions {
        before: args.before,
        after: args.after,
        inputs_in_db: args.inputs_in_db,
        outdir: args.outdir,
    };
    let written = run_burn_ratio(&options, &config)?;
    info!("Wrote {} burn-ratio raster(s)", written.len());
    Ok(())
}
