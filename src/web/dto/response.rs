//! Response DTOs for Web API.
//!
//! Every JSON body carries `success`; the push/pull client deserializes the
//! same types.

use serde::{Deserialize, Serialize};

use crate::datetime::to_rfc3339;
use crate::storage::StoredFile;

/// Body of `GET /` and `GET /api/health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always `true`.
    pub success: bool,
    /// `healthy` or `success`.
    pub status: String,
    /// Server local time.
    pub timestamp: String,
    /// Service name.
    pub service: String,
}

/// Body of a successful `POST /api/upload`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Stored (sanitized) filename.
    pub filename: String,
    /// Bucket the file was stored in.
    pub directory: String,
    /// Folder the file was stored in.
    pub folder: String,
    /// Retrieval reference (`folder/bucket/filename`).
    pub file_path: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Files removed by `clear_existing`.
    pub files_deleted: usize,
}

/// One stored file in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Filename.
    pub filename: String,
    /// Bucket name.
    pub directory: String,
    /// Bucket name.
    pub bucket: String,
    /// `bucket/filename`.
    pub relative_path: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Modification time (RFC 3339).
    pub modified: String,
    /// URL serving the file.
    pub download_url: String,
}

impl From<&StoredFile> for FileEntry {
    fn from(file: &StoredFile) -> Self {
        Self {
            filename: file.filename.clone(),
            directory: file.bucket.clone(),
            bucket: file.bucket.clone(),
            relative_path: file.relative_path(),
            size_bytes: file.size_bytes,
            modified: to_rfc3339(&file.modified_at),
            download_url: file.download_url(),
        }
    }
}

/// Body of `GET /api/download` when today's bucket holds several files.
#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadListResponse {
    /// Always `true`.
    pub success: bool,
    /// Human-readable message.
    pub message: String,
    /// Today's bucket.
    pub directory: String,
    /// Number of files.
    pub count: usize,
    /// Files sorted by filename.
    pub files: Vec<FileEntry>,
}

/// Files per folder.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct FileListing {
    /// Files in `downloads`.
    pub downloads: Vec<FileEntry>,
    /// Files in `uploads`.
    pub uploads: Vec<FileEntry>,
}

/// Body of `GET /api/list-files`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListFilesResponse {
    /// Always `true`.
    pub success: bool,
    /// Files per folder.
    pub files: FileListing,
}
