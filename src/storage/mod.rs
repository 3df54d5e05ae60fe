//! Date-bucketed file storage for filedrop.
//!
//! Files live in a two-level tree under a single root:
//! ```text
//! {root}/
//! ├── uploads/
//! │   └── 10-15-25/
//! │       └── traders.csv
//! └── downloads/
//!     └── 10-15-25/
//!         ├── a.csv
//!         └── b.csv
//! ```

mod path;
mod policy;
mod repository;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local};

use crate::FiledropError;

pub use path::{is_within, sanitize_filename, today_bucket, PathResolver, MAX_FILENAME_BYTES};
pub use policy::{todays_downloads, DownloadOutcome};
pub use repository::Repository;

/// Default maximum upload size (50 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: u64 = 50 * 1024 * 1024;

/// Top-level storage category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Folder {
    /// Files pushed by clients.
    Uploads,
    /// Files staged for clients to pull.
    Downloads,
}

impl Folder {
    /// Both folders, in listing order.
    pub const ALL: [Folder; 2] = [Folder::Uploads, Folder::Downloads];

    /// Directory name of this folder under the storage root.
    pub fn as_str(&self) -> &'static str {
        match self {
            Folder::Uploads => "uploads",
            Folder::Downloads => "downloads",
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Folder {
    type Err = FiledropError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploads" => Ok(Folder::Uploads),
            "downloads" => Ok(Folder::Downloads),
            other => Err(FiledropError::InvalidFolder(other.to_string())),
        }
    }
}

/// A file persisted in a bucket.
///
/// Identity is `(folder, bucket, filename)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    /// Sanitized base name.
    pub filename: String,
    /// Owning folder.
    pub folder: Folder,
    /// Bucket name (`MM-DD-YY`).
    pub bucket: String,
    /// Size on disk.
    pub size_bytes: u64,
    /// Filesystem modification time.
    pub modified_at: DateTime<Local>,
}

impl StoredFile {
    /// Path relative to the folder: `bucket/filename`.
    pub fn relative_path(&self) -> String {
        format!("{}/{}", self.bucket, self.filename)
    }

    /// Retrieval reference: `folder/bucket/filename`.
    pub fn reference(&self) -> String {
        format!("{}/{}/{}", self.folder, self.bucket, self.filename)
    }

    /// URL under which the file can be fetched from the web API.
    pub fn download_url(&self) -> String {
        format!(
            "/api/file/{}/{}/{}",
            self.folder,
            urlencoding::encode(&self.bucket),
            urlencoding::encode(&self.filename)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(filename: &str) -> StoredFile {
        StoredFile {
            filename: filename.to_string(),
            folder: Folder::Downloads,
            bucket: "10-15-25".to_string(),
            size_bytes: 3,
            modified_at: Local::now(),
        }
    }

    #[test]
    fn test_folder_from_str() {
        assert_eq!("uploads".parse::<Folder>().unwrap(), Folder::Uploads);
        assert_eq!("downloads".parse::<Folder>().unwrap(), Folder::Downloads);
        assert!(matches!(
            "both".parse::<Folder>(),
            Err(FiledropError::InvalidFolder(_))
        ));
        assert!("Uploads".parse::<Folder>().is_err());
    }

    #[test]
    fn test_folder_display() {
        assert_eq!(Folder::Uploads.to_string(), "uploads");
        assert_eq!(Folder::Downloads.to_string(), "downloads");
    }

    #[test]
    fn test_references() {
        let file = sample("traders.csv");
        assert_eq!(file.relative_path(), "10-15-25/traders.csv");
        assert_eq!(file.reference(), "downloads/10-15-25/traders.csv");
        assert_eq!(file.download_url(), "/api/file/downloads/10-15-25/traders.csv");
    }

    #[test]
    fn test_download_url_encodes_filename() {
        let file = sample("q3 report.csv");
        assert_eq!(
            file.download_url(),
            "/api/file/downloads/10-15-25/q3%20report.csv"
        );
    }
}
