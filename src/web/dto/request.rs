//! Request DTOs for Web API.

use serde::Deserialize;

use crate::storage::Folder;
use crate::web::error::ApiError;

/// Query of `GET /api/list-files`.
#[derive(Debug, Default, Deserialize)]
pub struct ListFilesQuery {
    /// `uploads`, `downloads` or `both` (default).
    #[serde(rename = "type")]
    pub file_type: Option<String>,
}

/// Which folders a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    /// Only one folder.
    Only(Folder),
    /// Both folders.
    Both,
}

impl ListType {
    /// Whether the listing includes `folder`.
    pub fn includes(&self, folder: Folder) -> bool {
        match self {
            ListType::Only(only) => *only == folder,
            ListType::Both => true,
        }
    }
}

impl ListFilesQuery {
    /// Parse the requested listing type.
    pub fn list_type(&self) -> Result<ListType, ApiError> {
        match self.file_type.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("") | Some("both") => Ok(ListType::Both),
            Some("uploads") => Ok(ListType::Only(Folder::Uploads)),
            Some("downloads") => Ok(ListType::Only(Folder::Downloads)),
            Some(other) => Err(ApiError::bad_request(format!(
                "Invalid type '{other}'. Must be 'uploads', 'downloads' or 'both'"
            ))),
        }
    }
}

/// Fields collected from a `POST /api/upload` multipart body.
#[derive(Debug, Default)]
pub struct UploadForm {
    /// Client-supplied filename of the `file` part.
    pub filename: Option<String>,
    /// Content of the `file` part.
    pub content: Option<Vec<u8>>,
    /// Target folder (lowercased); `uploads` when absent.
    pub folder: Option<String>,
    /// Whether today's bucket is emptied before storing.
    pub clear_existing: bool,
}

impl UploadForm {
    /// Target folder, defaulting to `uploads`.
    pub fn folder(&self) -> &str {
        self.folder
            .as_deref()
            .filter(|f| !f.is_empty())
            .unwrap_or(Folder::Uploads.as_str())
    }
}
