//! Repository over the on-disk bucket tree.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::path::{is_within, sanitize_filename, today_bucket, PathResolver};
use super::{Folder, StoredFile, DEFAULT_MAX_UPLOAD_SIZE};
use crate::datetime::{to_local, Clock};
use crate::{FiledropError, Result};

/// Storage service owning `root/uploads` and `root/downloads`.
///
/// The root and the clock are fixed at construction, so bucket selection is
/// deterministic under a [`crate::datetime::FixedClock`].
#[derive(Clone)]
pub struct Repository {
    paths: PathResolver,
    clock: Arc<dyn Clock>,
    max_upload_size: u64,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.paths.root())
            .field("max_upload_size", &self.max_upload_size)
            .finish()
    }
}

impl Repository {
    /// Open (and create if needed) a repository rooted at `root`.
    ///
    /// Both folder directories are created up front; failure here means the
    /// root is unusable.
    pub fn open(root: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Result<Self> {
        let root = root.into();
        for folder in Folder::ALL {
            fs::create_dir_all(root.join(folder.as_str()))?;
        }
        let root = fs::canonicalize(&root)?;

        debug!(root = %root.display(), "Opened file repository");

        Ok(Self {
            paths: PathResolver::new(root),
            clock,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        })
    }

    /// Override the maximum accepted content size in bytes.
    pub fn with_max_upload_size(mut self, bytes: u64) -> Self {
        self.max_upload_size = bytes;
        self
    }

    /// Canonical storage root.
    pub fn root(&self) -> &Path {
        self.paths.root()
    }

    /// Maximum accepted content size in bytes.
    pub fn max_upload_size(&self) -> u64 {
        self.max_upload_size
    }

    /// Clock used for bucket selection.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Bucket name for the current date.
    pub fn today_bucket(&self) -> String {
        today_bucket(self.clock.as_ref())
    }

    /// Store `content` as `raw_filename` in today's bucket of `folder`.
    ///
    /// An existing file with the same identity is replaced. Content is written
    /// to a hidden temporary file and renamed into place, so readers never
    /// observe a partial file.
    pub fn store(&self, folder: &str, raw_filename: &str, content: &[u8]) -> Result<StoredFile> {
        self.write_bucket_file(folder, raw_filename, content, false)
            .map(|(stored, _)| stored)
    }

    /// Like [`Repository::store`], but empty today's bucket first.
    ///
    /// The content is staged before anything is removed: if validation or the
    /// write fails, the bucket is left untouched. Returns the stored file and
    /// the number of files removed.
    pub fn replace_bucket(
        &self,
        folder: &str,
        raw_filename: &str,
        content: &[u8],
    ) -> Result<(StoredFile, usize)> {
        self.write_bucket_file(folder, raw_filename, content, true)
    }

    fn write_bucket_file(
        &self,
        folder: &str,
        raw_filename: &str,
        content: &[u8],
        clear_existing: bool,
    ) -> Result<(StoredFile, usize)> {
        let folder: Folder = folder.parse()?;
        let filename = sanitize_filename(raw_filename)?;

        let size = content.len() as u64;
        if size > self.max_upload_size {
            warn!(
                folder = %folder,
                filename = %filename,
                size,
                limit = self.max_upload_size,
                "Rejected oversized upload"
            );
            return Err(FiledropError::PayloadTooLarge {
                limit: self.max_upload_size,
            });
        }

        let bucket = self.today_bucket();
        let bucket_dir = self.paths.resolve_path(folder, &bucket)?;
        create_bucket_dir(&bucket_dir)?;
        let bucket_dir = self.ensure_contained(folder, &bucket_dir)?;

        let target = bucket_dir.join(&filename);
        let temp = bucket_dir.join(format!(".upload-{}.tmp", Uuid::new_v4()));
        let committed = write_temp(&temp, content)
            .map_err(FiledropError::from)
            .and_then(|()| {
                // The staged file is hidden, so clearing never removes it.
                if clear_existing {
                    self.clear_bucket_in(folder, &bucket)
                } else {
                    Ok(0)
                }
            })
            .and_then(|removed| {
                fs::rename(&temp, &target)?;
                Ok(removed)
            });
        let removed = match committed {
            Ok(removed) => removed,
            Err(e) => {
                let _ = fs::remove_file(&temp);
                return Err(e);
            }
        };

        let metadata = fs::metadata(&target)?;
        let stored = StoredFile {
            filename,
            folder,
            bucket,
            size_bytes: metadata.len(),
            modified_at: to_local(metadata.modified()?),
        };

        info!(
            reference = %stored.reference(),
            size_bytes = stored.size_bytes,
            "Stored file"
        );

        Ok((stored, removed))
    }

    /// List regular, non-hidden files in one bucket, sorted by filename.
    ///
    /// A missing bucket is an empty listing.
    pub fn list_bucket(&self, folder: &str, bucket: &str) -> Result<Vec<StoredFile>> {
        self.list_bucket_in(folder.parse()?, bucket)
    }

    /// List every bucket of `folder`, buckets and files in ascending order.
    pub fn list_all(&self, folder: &str) -> Result<Vec<StoredFile>> {
        let folder: Folder = folder.parse()?;
        let base = self.paths.folder_root(folder);

        let entries = match fs::read_dir(&base) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut buckets = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.starts_with('.') {
                    buckets.push(name.to_string());
                }
            }
        }
        buckets.sort();

        let mut files = Vec::new();
        for bucket in buckets {
            files.extend(self.list_bucket_in(folder, &bucket)?);
        }

        Ok(files)
    }

    /// Resolve `filepath` (`filename` or `bucket/filename`) to a readable file.
    pub fn resolve(&self, folder: &str, filepath: &str) -> Result<PathBuf> {
        let folder: Folder = folder.parse()?;
        let candidate = self.paths.resolve_path(folder, filepath)?;
        let not_found = || FiledropError::NotFound(format!("file {filepath}"));

        let base = self.paths.folder_root(folder);
        let hidden = candidate
            .strip_prefix(&base)
            .map(|rel| rel.components().any(is_hidden_component))
            .unwrap_or(true);
        if hidden {
            return Err(not_found());
        }

        let canonical = match fs::canonicalize(&candidate) {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        let canonical = self.ensure_contained_canonical(folder, canonical, filepath)?;

        if !fs::metadata(&canonical)?.is_file() {
            return Err(not_found());
        }

        Ok(canonical)
    }

    /// Delete every regular, non-hidden file in a bucket.
    ///
    /// Returns the number of files removed.
    pub fn clear_bucket(&self, folder: &str, bucket: &str) -> Result<usize> {
        self.clear_bucket_in(folder.parse()?, bucket)
    }

    fn clear_bucket_in(&self, folder: Folder, bucket: &str) -> Result<usize> {
        let dir = self.paths.resolve_path(folder, bucket)?;

        let mut removed = 0;
        for file in self.list_bucket_in(folder, bucket)? {
            match fs::remove_file(dir.join(&file.filename)) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        if removed > 0 {
            info!(folder = %folder, bucket, removed, "Cleared bucket");
        }

        Ok(removed)
    }

    fn list_bucket_in(&self, folder: Folder, bucket: &str) -> Result<Vec<StoredFile>> {
        let dir = self.paths.resolve_path(folder, bucket)?;

        // Symlinked bucket directories are not followed.
        match fs::symlink_metadata(&dir) {
            Ok(m) if m.is_dir() => {}
            Ok(_) => return Ok(Vec::new()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let Some(filename) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if filename.starts_with('.') {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(m) => m,
                // removed between read_dir and stat
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            files.push(StoredFile {
                filename,
                folder,
                bucket: bucket.to_string(),
                size_bytes: metadata.len(),
                modified_at: to_local(metadata.modified()?),
            });
        }

        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(files)
    }

    fn ensure_contained(&self, folder: Folder, path: &Path) -> Result<PathBuf> {
        let canonical = fs::canonicalize(path)?;
        self.ensure_contained_canonical(folder, canonical, &path.to_string_lossy())
    }

    fn ensure_contained_canonical(
        &self,
        folder: Folder,
        canonical: PathBuf,
        requested: &str,
    ) -> Result<PathBuf> {
        let base = fs::canonicalize(self.paths.folder_root(folder))?;
        if !is_within(&base, &canonical) {
            warn!(
                folder = %folder,
                requested,
                resolved = %canonical.display(),
                "Resolved path escapes folder"
            );
            return Err(FiledropError::PathTraversal(requested.to_string()));
        }
        Ok(canonical)
    }
}

fn is_hidden_component(component: Component<'_>) -> bool {
    component.as_os_str().to_string_lossy().starts_with('.')
}

/// Create a bucket directory; losing a creation race is not an error.
fn create_bucket_dir(dir: &Path) -> io::Result<()> {
    match fs::create_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => Ok(()),
        Err(e) => Err(e),
    }
}

fn write_temp(temp: &Path, content: &[u8]) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(temp)?;
    file.write_all(content)?;
    file.sync_all()
}
