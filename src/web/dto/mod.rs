//! Data transfer objects for the Web API.

pub mod request;
pub mod response;

pub use request::{ListFilesQuery, ListType, UploadForm};
pub use response::{
    DownloadListResponse, FileEntry, FileListing, ListFilesResponse, StatusResponse,
    UploadResponse,
};
