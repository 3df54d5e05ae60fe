//! Push/pull client for a filedrop server.
//!
//! `push` uploads local files through `POST /api/upload`; `pull` fetches
//! today's downloads through `GET /api/download`, following the listing when
//! the server holds more than one file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

use crate::storage::sanitize_filename;
use crate::web::dto::{DownloadListResponse, UploadResponse};
use crate::{FiledropError, Result};

/// Default server used by the CLI.
pub const DEFAULT_SERVER: &str = "http://127.0.0.1:5000";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Outcome of pushing several files.
#[derive(Debug, Default)]
pub struct PushReport {
    /// Server receipts of successful uploads.
    pub uploaded: Vec<UploadResponse>,
    /// Files that failed, with the reason.
    pub failed: Vec<(PathBuf, FiledropError)>,
}

impl PushReport {
    /// Whether every file was uploaded.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// HTTP client bound to one server.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    base: Url,
}

impl Client {
    /// Create a client for `server` (e.g. `http://host:5000`).
    pub fn new(server: &str) -> Result<Self> {
        let base = Url::parse(server)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, base })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    /// Upload one file into `folder`.
    pub async fn upload(&self, path: &Path, folder: &str) -> Result<UploadResponse> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FiledropError::InvalidName(path.display().to_string()))?
            .to_string();
        let content = tokio::fs::read(path).await?;

        debug!(file = %path.display(), size = content.len(), "Uploading");

        let form = Form::new()
            .text("folder", folder.to_string())
            .part("file", Part::bytes(content).file_name(filename));

        let response = self
            .http
            .post(self.endpoint("/api/upload")?)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        Ok(response.json::<UploadResponse>().await?)
    }

    /// Upload every file in `paths`, continuing past failures.
    pub async fn push(&self, paths: &[PathBuf], folder: &str) -> PushReport {
        let mut report = PushReport::default();

        for path in paths {
            match self.upload(path, folder).await {
                Ok(receipt) => {
                    info!(
                        file = %path.display(),
                        stored = %receipt.file_path,
                        size_bytes = receipt.size_bytes,
                        "Uploaded"
                    );
                    report.uploaded.push(receipt);
                }
                Err(e) => {
                    warn!(file = %path.display(), "Upload failed: {}", e);
                    report.failed.push((path.clone(), e));
                }
            }
        }

        report
    }

    /// Download today's files into `dir`.
    ///
    /// Returns the saved paths; an empty result means the server had nothing
    /// for today.
    pub async fn pull(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        tokio::fs::create_dir_all(dir).await?;

        let response = self.http.get(self.endpoint("/api/download")?).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!("No files available for today");
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        if !is_json(&response) {
            let filename = response
                .headers()
                .get(CONTENT_DISPOSITION)
                .and_then(|v| v.to_str().ok())
                .and_then(attachment_filename)
                .unwrap_or_else(|| "download".to_string());
            return Ok(vec![save_response(dir, &filename, response).await?]);
        }

        let listing: DownloadListResponse = response.json().await?;
        info!(
            directory = %listing.directory,
            count = listing.count,
            "Server listed multiple files"
        );

        let mut saved = Vec::with_capacity(listing.files.len());
        for entry in listing.files {
            let response = self
                .http
                .get(self.endpoint(&entry.download_url)?)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(error_from_response(response).await);
            }
            saved.push(save_response(dir, &entry.filename, response).await?);
        }

        Ok(saved)
    }
}

/// Regular, non-hidden files directly inside `dir`, sorted by name.
pub fn files_in_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !hidden && entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"))
}

/// Filename from a `Content-Disposition` value, preferring `filename*`.
fn attachment_filename(value: &str) -> Option<String> {
    let mut plain = None;

    for param in value.split(';').map(str::trim) {
        if let Some(encoded) = param.strip_prefix("filename*=") {
            let encoded = encoded
                .strip_prefix("UTF-8''")
                .or_else(|| encoded.strip_prefix("utf-8''"))
                .unwrap_or(encoded);
            if let Ok(decoded) = urlencoding::decode(encoded) {
                return Some(decoded.into_owned());
            }
        } else if let Some(name) = param.strip_prefix("filename=") {
            plain = Some(name.trim_matches('"').to_string());
        }
    }

    plain
}

async fn save_response(dir: &Path, filename: &str, response: Response) -> Result<PathBuf> {
    let path = dir.join(sanitize_filename(filename)?);
    let content = response.bytes().await?;
    tokio::fs::write(&path, &content).await?;
    info!(file = %path.display(), size = content.len(), "Saved");
    Ok(path)
}

async fn error_from_response(response: Response) -> FiledropError {
    let status = response.status();
    let message = match response.json::<serde_json::Value>().await {
        Ok(body) => body["error"]
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| status.to_string()),
        Err(_) => status.to_string(),
    };
    FiledropError::Client(format!("server returned {status}: {message}"))
}
