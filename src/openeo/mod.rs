//! Sentinel-1 scene download through an openEO backend.

pub mod client;
pub mod request;

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use log::info;

use crate::error::Result;

pub use client::{Asset, JobClient, JobStatus};
pub use request::{DEFAULT_BACKEND, DEFAULT_COLLECTION, REQUEST_FILE, SceneRequest, load_aoi};

/// Environment variable holding the bearer token when `--token` is absent.
pub const TOKEN_ENV: &str = "OPENEO_TOKEN";

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    pub aoi: PathBuf,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub collection: String,
    pub backend: String,
    pub outdir: Option<PathBuf>,
    pub token: Option<String>,
    pub poll_seconds: u64,
    pub dry_run: bool,
}

impl DownloadOptions {
    /// `--outdir`, or `s1_grd_<start>_<end>`.
    pub fn output_dir(&self) -> PathBuf {
        self.outdir
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("s1_grd_{}_{}", self.start, self.end)))
    }
}

/// Saves `request.json`, then (unless dry-run) submits the batch job, waits
/// for it and downloads every result asset. Returns the downloaded files.
pub fn run_download(options: &DownloadOptions) -> Result<Vec<PathBuf>> {
    let aoi = load_aoi(&options.aoi)?;
    let request = SceneRequest::new(
        options.backend.as_str(),
        options.collection.as_str(),
        aoi,
        options.start,
        options.end,
    )?;

    let outdir = options.output_dir();
    let saved = request.save(&outdir)?;
    info!("Saved request to {}", saved.display());

    if options.dry_run {
        info!("Dry run: not submitting to {}", request.backend);
        return Ok(Vec::new());
    }

    let token = options
        .token
        .clone()
        .or_else(|| std::env::var(TOKEN_ENV).ok());
    let client = JobClient::new(&request.backend, token)
        .with_poll_interval(Duration::from_secs(options.poll_seconds.max(1)));

    let id = client.create_job(&request)?;
    client.start_job(&id)?;
    client.wait(&id)?;

    let assets = client.assets(&id)?;
    info!("Job {} produced {} asset(s)", id, assets.len());
    assets
        .iter()
        .map(|(key, asset)| client.download(key, asset, &outdir))
        .collect()
}
