use std::path::PathBuf;

use clap::Parser;
use log::info;

use s1burn::config::parse_date;
use s1burn::openeo::{DEFAULT_BACKEND, DEFAULT_COLLECTION, DownloadOptions, run_download};

#[derive(Parser, Debug)]
#[command(name = "s1_download")]
#[command(about = "Request Sentinel-1 VV/VH backscatter for an AOI from an openEO backend")]
#[command(version)]
struct Args {
    /// GeoJSON AOI (Polygon, MultiPolygon, Feature or FeatureCollection)
    #[arg(long, value_name = "FILE")]
    aoi: PathBuf,

    /// First acquisition date
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: String,

    /// Last acquisition date
    #[arg(long, value_name = "YYYY-MM-DD")]
    end: String,

    /// openEO collection id
    #[arg(long, value_name = "ID", default_value = DEFAULT_COLLECTION)]
    collection: String,

    /// openEO API root
    #[arg(long, value_name = "URL", default_value = DEFAULT_BACKEND)]
    backend: String,

    /// Output folder (default: s1_grd_<START>_<END>)
    #[arg(long, value_name = "DIR")]
    outdir: Option<PathBuf>,

    /// Bearer token (default: $OPENEO_TOKEN)
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Seconds between job status checks
    #[arg(long, value_name = "N", default_value_t = 30)]
    poll_seconds: u64,

    /// Only write request.json
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> s1burn::Result<()> {
    let args = Args::parse();
    s1burn::init_logging(args.verbose);

    let options = DownloadOptions {
        aoi: args.aoi,
        start: parse_date(&args.start)?,
        end: parse_date(&args.end)?,
        collection: args.collection,
        backend: args.backend,
        outdir: args.outdir,
        token: args.token,
        poll_seconds: args.poll_seconds,
        dry_run: args.dry_run,
    };
    let files = run_download(&options)?;
    info!("Done. {} file(s) in {}", files.len(), options.output_dir().display());
    Ok(())
}
