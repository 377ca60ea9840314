use chrono::NaiveDate;

use serde::Deserialize;
use serde::Deserializer;
use serde::de::Error;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub mod error;
pub use error::ConfigError;

pub const DEFAULT_NODATA: f64 = -9999.0;
pub const DEFAULT_EPSILON: f64 = 1e-12;
pub const DEFAULT_TILE_SIZE: usize = 256;
pub const DEFAULT_COMPRESSION: &str = "DEFLATE";
pub const DEFAULT_NUM_THREADS: usize = 2;

const VALID_COMPRESSIONS: [&str; 4] = ["DEFLATE", "LZW", "ZSTD", "NONE"];

/// Processing parameters shared by the command-line tools.
///
/// Nothing here is process-global: every core function receives the values it
/// needs from a `Config` so alternate thresholds or sentinels can be used.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    threshold_date: NaiveDate,
    nodata: f64,
    epsilon: f64,
    tile_size: usize,
    compression: String,
    num_threads: usize,
}

// Deserializes a Config from JSON. Every key is optional; dates and the
// GeoTIFF creation settings are validated here so a bad file fails early.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct ConfigHelper {
            threshold_date: Option<String>,
            nodata: Option<f64>,
            epsilon: Option<f64>,
            tile_size: Option<usize>,
            compression: Option<String>,
            num_threads: Option<usize>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let threshold_date = match helper.threshold_date {
            Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|e| D::Error::custom(format!("Invalid threshold_date format: {}", e)))?,
            None => defaults.threshold_date,
        };

        let tile_size = helper.tile_size.unwrap_or(defaults.tile_size);
        validate_tile_size(tile_size).map_err(D::Error::custom)?;

        let compression = helper
            .compression
            .map(|c| c.to_uppercase())
            .unwrap_or(defaults.compression);
        validate_compression(&compression).map_err(D::Error::custom)?;

        let num_threads = helper.num_threads.unwrap_or(defaults.num_threads);
        if num_threads == 0 {
            return Err(D::Error::custom(ConfigError::Threads));
        }

        Ok(Config {
            threshold_date,
            nodata: helper.nodata.unwrap_or(defaults.nodata),
            epsilon: helper.epsilon.unwrap_or(defaults.epsilon),
            tile_size,
            compression,
            num_threads,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Fire start used by the burn-scar study area.
            threshold_date: NaiveDate::from_ymd_opt(2023, 7, 18).unwrap_or_default(),
            nodata: DEFAULT_NODATA,
            epsilon: DEFAULT_EPSILON,
            tile_size: DEFAULT_TILE_SIZE,
            compression: DEFAULT_COMPRESSION.to_string(),
            num_threads: DEFAULT_NUM_THREADS,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let config: Config = serde_json::from_reader(reader).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Loads `path` when given, otherwise falls back to the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        match path {
            Some(p) => Config::from_file(p),
            None => Ok(Config::default()),
        }
    }

    pub fn with_threshold_date(mut self, threshold_date: NaiveDate) -> Self {
        self.threshold_date = threshold_date;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Result<Self, ConfigError> {
        if num_threads == 0 {
            return Err(ConfigError::Threads);
        }
        self.num_threads = num_threads;
        Ok(self)
    }

    pub fn threshold_date(&self) -> NaiveDate {
        self.threshold_date
    }

    pub fn nodata(&self) -> f64 {
        self.nodata
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    pub fn compression(&self) -> &str {
        &self.compression
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

/// Parses a `YYYY-MM-DD` command-line date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ConfigError> {
    Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?)
}

fn validate_tile_size(tile_size: usize) -> Result<(), ConfigError> {
    if tile_size == 0 || tile_size % 16 != 0 {
        return Err(ConfigError::TileSize(tile_size));
    }
    Ok(())
}

fn validate_compression(compression: &str) -> Result<(), ConfigError> {
    if !VALID_COMPRESSIONS.contains(&compression) {
        return Err(ConfigError::Compression(compression.to_string()));
    }
    Ok(())
}
