use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::config::ConfigError;
use crate::error::{Result, S1Error};

pub const DEFAULT_BACKEND: &str = "https://openeo.cloud/openeo/1.2";
pub const DEFAULT_COLLECTION: &str = "SENTINEL1_GRD";
pub const REQUEST_FILE: &str = "request.json";

const AOI_TYPES: [&str; 4] = ["Polygon", "MultiPolygon", "Feature", "FeatureCollection"];

/// A Sentinel-1 backscatter batch request for one AOI and date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneRequest {
    pub backend: String,
    pub collection: String,
    pub aoi: Value,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bands: Vec<String>,
    pub title: String,
}

impl SceneRequest {
    /// Builds a validated VV/VH request.
    pub fn new(
        backend: impl Into<String>,
        collection: impl Into<String>,
        aoi: Value,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Self> {
        let request = Self {
            backend: backend.into(),
            collection: collection.into(),
            aoi,
            start,
            end,
            bands: vec!["VV".to_string(), "VH".to_string()],
            title: format!("S1 GRD backscatter VV/VH {}..{}", start, end),
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(ConfigError::DateOrder.into());
        }
        let kind = self.aoi.get("type").and_then(Value::as_str);
        match kind {
            Some(kind) if AOI_TYPES.contains(&kind) => {}
            Some(kind) => {
                return Err(S1Error::Request(format!(
                    "AOI type '{}' is not one of {}",
                    kind,
                    AOI_TYPES.join(", ")
                )));
            }
            None => {
                return Err(S1Error::Request(
                    "AOI must be a GeoJSON object with a 'type'".to_string(),
                ));
            }
        }
        if self.bands.is_empty() {
            return Err(S1Error::Request("no bands requested".to_string()));
        }
        Ok(())
    }

    /// load_collection -> sar_backscatter -> save_result(GTiff).
    pub fn process_graph(&self) -> Value {
        json!({
            "load1": {
                "process_id": "load_collection",
                "arguments": {
                    "id": self.collection,
                    "spatial_extent": self.aoi,
                    "temporal_extent": [self.start.to_string(), self.end.to_string()],
                    "bands": self.bands,
                }
            },
            "sar1": {
                "process_id": "sar_backscatter",
                "arguments": {
                    "data": { "from_node": "load1" },
                    "local_incidence_angle": true,
                    "mask": true,
                }
            },
            "save1": {
                "process_id": "save_result",
                "arguments": {
                    "data": { "from_node": "sar1" },
                    "format": "GTiff",
                },
                "result": true
            }
        })
    }

    /// Body of `POST /jobs`.
    pub fn job_body(&self) -> Value {
        json!({
            "title": self.title,
            "process": { "process_graph": self.process_graph() },
        })
    }

    /// Writes the request as pretty JSON to `<dir>/request.json`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(REQUEST_FILE);
        fs::write(&path, serde_json::to_string_pretty(self)?)?;
        Ok(path)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let request: SceneRequest = serde_json::from_str(&fs::read_to_string(path)?)?;
        request.validate()?;
        Ok(request)
    }
}

/// Reads a GeoJSON AOI file.
pub fn load_aoi(path: &Path) -> Result<Value> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}
