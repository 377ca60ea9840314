use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum S1Error {
    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Band {band} out of range for {path} ({count} bands)")]
    InvalidBand {
        path: PathBuf,
        band: usize,
        count: usize,
    },

    #[error("Raster shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Reprojection failed: {0}")]
    Reprojection(String),

    #[error("Neither VV nor VH found in both inputs")]
    NoCommonPolarization,

    #[error("Invalid scene request: {0}")]
    Request(String),

    #[error("openEO backend error: {0}")]
    Http(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, S1Error>;
