//! File handlers for Web API.

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::storage::{todays_downloads, DownloadOutcome, Folder};
use crate::web::dto::{
    DownloadListResponse, FileEntry, FileListing, ListFilesQuery, ListFilesResponse, UploadForm,
    UploadResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::FiledropError;

/// Build a `Content-Disposition: attachment` value for `filename`.
///
/// Control characters, quotes and backslashes are replaced in the plain
/// `filename` parameter; non-ASCII names additionally get an RFC 5987
/// `filename*` parameter.
fn content_disposition_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_control() || !c.is_ascii() => '_',
            c => c,
        })
        .collect();

    if fallback == filename {
        return format!("attachment; filename=\"{filename}\"");
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Stream a file from disk as an attachment.
async fn file_response(path: &FsPath, filename: &str) -> Result<Response, ApiError> {
    let file = tokio::fs::File::open(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ApiError::not_found("File not found")
        } else {
            tracing::error!(path = %path.display(), "Failed to open file: {}", e);
            ApiError::internal("Failed to read file")
        }
    })?;
    let size = file
        .metadata()
        .await
        .map_err(|e| {
            tracing::error!(path = %path.display(), "Failed to stat file: {}", e);
            ApiError::internal("Failed to read file")
        })?
        .len();

    let content_type = mime_guess::from_path(filename)
        .first_or_octet_stream()
        .to_string();

    tracing::debug!(path = %path.display(), size, "Streaming file");

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(filename),
        )
        .header(header::CONTENT_LENGTH, size)
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

fn multipart_error(state: &AppState, e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return FiledropError::PayloadTooLarge {
            limit: state.repository.max_upload_size(),
        }
        .into();
    }
    tracing::warn!("Failed to read multipart body: {}", e);
    ApiError::bad_request("Invalid multipart data")
}

/// Read the upload form, enforcing the size limit while the file streams in.
async fn read_upload_form(state: &AppState, mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let limit = state.repository.max_upload_size();
    let mut form = UploadForm::default();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(state, e))?
    {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "file" => {
                form.filename = Some(field.file_name().unwrap_or("").to_string());
                let mut content = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error(state, e))? {
                    if (content.len() + chunk.len()) as u64 > limit {
                        return Err(FiledropError::PayloadTooLarge { limit }.into());
                    }
                    content.extend_from_slice(&chunk);
                }
                form.content = Some(content);
            }
            "folder" => {
                let folder = field.text().await.map_err(|e| multipart_error(state, e))?;
                form.folder = Some(folder.trim().to_lowercase());
            }
            "clear_existing" => {
                let value = field.text().await.map_err(|e| multipart_error(state, e))?;
                form.clear_existing = value.trim().eq_ignore_ascii_case("true");
            }
            _ => {}
        }
    }

    Ok(form)
}

/// GET|POST /api/download - Hand out today's downloads.
///
/// One file is streamed directly; several files are returned as a listing;
/// none is a 404.
pub async fn download_today(State(state): State<Arc<AppState>>) -> Result<Response, ApiError> {
    let outcome = state.with_repository(todays_downloads).await?;

    match outcome {
        DownloadOutcome::Empty { bucket } => Err(ApiError::not_found(format!(
            "No files found in today's directory ({bucket})"
        ))
        .with_directory(bucket)),
        DownloadOutcome::Single(file) => {
            let relative = file.relative_path();
            let path = state
                .with_repository(move |repo| repo.resolve(Folder::Downloads.as_str(), &relative))
                .await?;
            tracing::info!(reference = %file.reference(), "Serving today's download");
            file_response(&path, &file.filename).await
        }
        DownloadOutcome::Multiple { bucket, files } => {
            let files: Vec<FileEntry> = files.iter().map(FileEntry::from).collect();
            Ok(Json(DownloadListResponse {
                success: true,
                message: format!("Multiple files found in today's directory ({bucket})"),
                directory: bucket,
                count: files.len(),
                files,
            })
            .into_response())
        }
    }
}

/// POST /api/upload - Store a file in today's bucket.
///
/// Request body: multipart/form-data with `file`, optional `folder`
/// (`uploads` | `downloads`, default `uploads`) and optional
/// `clear_existing` (`true` empties today's bucket first).
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let multipart = multipart.map_err(|e| {
        tracing::warn!("Rejected upload request: {}", e);
        ApiError::bad_request("No file provided")
    })?;
    let form = read_upload_form(&state, multipart).await?;

    let folder = form.folder().to_string();
    let clear_existing = form.clear_existing;
    let (filename, content) = match (form.filename, form.content) {
        (Some(filename), Some(content)) => (filename, content),
        _ => return Err(ApiError::bad_request("No file provided")),
    };
    if filename.is_empty() {
        return Err(ApiError::bad_request("No file selected"));
    }

    let (stored, files_deleted) = state
        .with_repository(move |repo| {
            if clear_existing {
                repo.replace_bucket(&folder, &filename, &content)
            } else {
                Ok((repo.store(&folder, &filename, &content)?, 0))
            }
        })
        .await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded successfully".to_string(),
        filename: stored.filename.clone(),
        directory: stored.bucket.clone(),
        folder: stored.folder.to_string(),
        file_path: stored.reference(),
        size_bytes: stored.size_bytes,
        files_deleted,
    }))
}

/// GET /api/list-files - List stored files per folder.
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ListFilesResponse>, ApiError> {
    let list_type = query.list_type()?;

    let files = state
        .with_repository(move |repo| {
            let mut listing = FileListing::default();
            if list_type.includes(Folder::Downloads) {
                listing.downloads = entries(&repo.list_all(Folder::Downloads.as_str())?);
            }
            if list_type.includes(Folder::Uploads) {
                listing.uploads = entries(&repo.list_all(Folder::Uploads.as_str())?);
            }
            Ok(listing)
        })
        .await?;

    Ok(Json(ListFilesResponse {
        success: true,
        files,
    }))
}

fn entries(files: &[crate::storage::StoredFile]) -> Vec<FileEntry> {
    files.iter().map(FileEntry::from).collect()
}

/// GET /api/file/:file_type/*filepath - Download a specific file.
///
/// `filepath` is `bucket/filename` (or a bare filename).
pub async fn get_file(
    State(state): State<Arc<AppState>>,
    Path((file_type, filepath)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let folder = file_type.to_lowercase();
    let relative = filepath.trim_start_matches('/').to_string();

    let path = state
        .with_repository(move |repo| repo.resolve(&folder, &relative))
        .await?;

    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download")
        .to_string();

    file_response(&path, &filename).await
}
