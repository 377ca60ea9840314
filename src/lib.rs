//! Sentinel-1 SAR burn-scar toolkit: before/after averaging, relative burn
//! ratio, PNG previews and openEO scene download for VV/VH GeoTIFFs.

pub mod acq_date;
pub mod align;
pub mod average;
pub mod bands;
pub mod burn_ratio;
pub mod config;
pub mod error;
pub mod openeo;
pub mod preview;
pub mod readers;
pub mod stats;
pub mod writer;

use env_logger::Env;

pub use config::{Config, ConfigError};
pub use error::{Result, S1Error};

/// Initializes `env_logger`; `RUST_LOG` still overrides the default level.
pub fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();
}
