use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use log::{debug, info};
use serde::Deserialize;
use tempfile::NamedTempFile;

use super::request::SceneRequest;
use crate::error::{Result, S1Error};

/// Lifecycle states of an openEO batch job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Created,
    Queued,
    Running,
    Finished,
    Error,
    Canceled,
}

impl JobStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "created" => Some(JobStatus::Created),
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "finished" => Some(JobStatus::Finished),
            "error" => Some(JobStatus::Error),
            "canceled" => Some(JobStatus::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Finished | JobStatus::Error | JobStatus::Canceled)
    }
}

#[derive(Debug, Deserialize)]
struct JobInfo {
    status: String,
}

/// One downloadable result file of a finished job.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Asset {
    pub href: String,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct JobResults {
    #[serde(default)]
    assets: BTreeMap<String, Asset>,
}

/// Parses the asset map of a `GET /jobs/{id}/results` document.
pub fn parse_assets(body: &str) -> Result<BTreeMap<String, Asset>> {
    let results: JobResults = serde_json::from_str(body)?;
    Ok(results.assets)
}

/// Local file name for an asset key; keys may carry folders.
pub fn asset_file_name(key: &str) -> Option<String> {
    Path::new(key)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .filter(|name| !name.is_empty() && name != "..")
}

fn http_error(err: ureq::Error) -> S1Error {
    S1Error::Http(err.to_string())
}

/// Minimal blocking client for the openEO batch-job endpoints.
#[derive(Debug, Clone)]
pub struct JobClient {
    base: String,
    token: Option<String>,
    poll_interval: Duration,
}

impl JobClient {
    pub fn new(backend: &str, token: Option<String>) -> Self {
        Self {
            base: backend.trim_end_matches('/').to_string(),
            token,
            poll_interval: Duration::from_secs(30),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        match &self.token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// `POST /jobs`; returns the new job id.
    pub fn create_job(&self, request: &SceneRequest) -> Result<String> {
        let response = self
            .authorize(ureq::post(&self.url("jobs")))
            .send_json(request.job_body())
            .map_err(http_error)?;

        let id = response
            .headers()
            .get("OpenEO-Identifier")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| S1Error::Http("job created without an OpenEO-Identifier header".to_string()))?;
        info!("Created batch job {}", id);
        Ok(id)
    }

    /// `POST /jobs/{id}/results`.
    pub fn start_job(&self, id: &str) -> Result<()> {
        self.authorize(ureq::post(&self.url(&format!("jobs/{}/results", id))))
            .send_empty()
            .map_err(http_error)?;
        info!("Started batch job {}", id);
        Ok(())
    }

    /// `GET /jobs/{id}`.
    pub fn status(&self, id: &str) -> Result<JobStatus> {
        let info: JobInfo = self
            .authorize(ureq::get(&self.url(&format!("jobs/{}", id))))
            .call()
            .map_err(http_error)?
            .into_body()
            .read_json()
            .map_err(http_error)?;
        JobStatus::parse(&info.status)
            .ok_or_else(|| S1Error::Http(format!("unknown job status '{}'", info.status)))
    }

    /// Polls until the job finishes. `error` and `canceled` are failures.
    pub fn wait(&self, id: &str) -> Result<()> {
        loop {
            let status = self.status(id)?;
            debug!("Job {} is {:?}", id, status);
            match status {
                JobStatus::Finished => return Ok(()),
                JobStatus::Error | JobStatus::Canceled => {
                    return Err(S1Error::Http(format!("job {} ended as {:?}", id, status)));
                }
                _ => thread::sleep(self.poll_interval),
            }
        }
    }

    /// `GET /jobs/{id}/results`.
    pub fn assets(&self, id: &str) -> Result<BTreeMap<String, Asset>> {
        let body = self
            .authorize(ureq::get(&self.url(&format!("jobs/{}/results", id))))
            .call()
            .map_err(http_error)?
            .into_body()
            .read_to_string()
            .map_err(http_error)?;
        parse_assets(&body)
    }

    /// Streams one asset into `outdir`. Partial downloads never appear
    /// under the final name.
    pub fn download(&self, key: &str, asset: &Asset, outdir: &Path) -> Result<PathBuf> {
        let name = asset_file_name(key)
            .ok_or_else(|| S1Error::Http(format!("asset '{}' has no usable file name", key)))?;
        fs::create_dir_all(outdir)?;

        let request = ureq::get(&asset.href);
        // signed asset URLs on other hosts must not receive the token
        let request = if asset.href.starts_with(&self.base) {
            self.authorize(request)
        } else {
            request
        };
        let response = request.call().map_err(http_error)?;

        let mut tmp = NamedTempFile::new_in(outdir)?;
        io::copy(&mut response.into_body().into_reader(), &mut tmp)?;
        let dest = outdir.join(name);
        tmp.persist(&dest).map_err(|e| e.error)?;
        info!("[OK] {}", dest.display());
        Ok(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parsing() {
        assert_eq!(JobStatus::parse("finished"), Some(JobStatus::Finished));
        assert_eq!(JobStatus::parse(" Running "), Some(JobStatus::Running));
        assert_eq!(JobStatus::parse("bogus"), None);
        assert!(JobStatus::Canceled.is_terminal());
        assert!(!JobStatus::Queued.is_terminal());
    }

    #[test]
    fn test_urls() {
        let client = JobClient::new("https://example.org/openeo/1.2/", None);
        assert_eq!(client.url("jobs"), "https://example.org/openeo/1.2/jobs");
        assert_eq!(client.url("/jobs/j-1/results"), "https://example.org/openeo/1.2/jobs/j-1/results");
    }

    #[test]
    fn test_parse_assets() {
        let body = r#"{
            "type": "Feature",
            "assets": {
                "openEO_2023-07-15Z.tif": {"href": "https://files.example/a.tif", "type": "image/tiff; application=geotiff"},
                "job-results.json": {"href": "https://files.example/meta.json"}
            }
        }"#;
        let assets = parse_assets(body).unwrap();
        assert_eq!(assets.len(), 2);
        assert_eq!(assets["openEO_2023-07-15Z.tif"].href, "https://files.example/a.tif");
        assert_eq!(assets["job-results.json"].media_type, None);

        assert!(parse_assets(r#"{"type": "Feature"}"#).unwrap().is_empty());
    }

    #[test]
    fn test_asset_file_names() {
        assert_eq!(asset_file_name("out/scene_VV.tif").as_deref(), Some("scene_VV.tif"));
        assert_eq!(asset_file_name("scene.tif").as_deref(), Some("scene.tif"));
        assert_eq!(asset_file_name(".."), None);
        assert_eq!(asset_file_name(""), None);
    }
}
