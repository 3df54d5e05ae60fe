//! Conversion of untrusted names and paths into safe storage locations.
//!
//! Everything in this module is pure: no function here touches the
//! filesystem. Symlink-aware checks are layered on top by the repository.

use std::path::{Path, PathBuf};

use super::Folder;
use crate::datetime::{format_bucket, Clock};
use crate::{FiledropError, Result};

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Longest base name accepted, in bytes (the common filesystem limit).
pub const MAX_FILENAME_BYTES: usize = 255;

/// `/x` and `\x` paths; on Windows also drive-qualified `C:x` paths.
///
/// Elsewhere `a:b.txt` is an ordinary filename.
fn has_absolute_prefix(s: &str) -> bool {
    if s.starts_with(is_separator) {
        return true;
    }
    let mut chars = s.chars();
    cfg!(windows)
        && matches!(
            (chars.next(), chars.next()),
            (Some(drive), Some(':')) if drive.is_ascii_alphabetic()
        )
}

/// Reduce an untrusted filename to a safe base name.
///
/// Directory components are stripped (`reports/traders.csv` becomes
/// `traders.csv`) and control characters removed. Names carrying a `..`
/// segment or an absolute prefix are rejected outright, as are names that
/// end up empty, `.`, `..`, hidden or longer than [`MAX_FILENAME_BYTES`].
pub fn sanitize_filename(raw: &str) -> Result<String> {
    let cleaned: String = raw.chars().filter(|c| !c.is_control()).collect();
    let cleaned = cleaned.trim();

    if has_absolute_prefix(cleaned) || cleaned.split(is_separator).any(|seg| seg.trim() == "..") {
        return Err(FiledropError::InvalidName(raw.to_string()));
    }

    let base = cleaned.rsplit(is_separator).next().unwrap_or_default().trim();

    if base.is_empty() || base == "." || base == ".." || base.starts_with('.') {
        return Err(FiledropError::InvalidName(raw.to_string()));
    }
    if base.len() > MAX_FILENAME_BYTES {
        return Err(FiledropError::InvalidName(raw.to_string()));
    }

    Ok(base.to_string())
}

/// Name of the bucket for the clock's current local date.
///
/// The boundary is local midnight: a file stored at 23:59 and one stored two
/// minutes later land in different buckets.
pub fn today_bucket(clock: &dyn Clock) -> String {
    format_bucket(clock.today())
}

/// Whether `candidate` lies strictly inside `base` (component-wise).
pub fn is_within(base: &Path, candidate: &Path) -> bool {
    candidate != base && candidate.starts_with(base)
}

/// Builds absolute paths under `root/{folder}/`.
#[derive(Debug, Clone)]
pub struct PathResolver {
    root: PathBuf,
}

impl PathResolver {
    /// Create a resolver over the given storage root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Storage root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `root/{folder}`.
    pub fn folder_root(&self, folder: Folder) -> PathBuf {
        self.root.join(folder.as_str())
    }

    /// Resolve `relative` (a bucket, or `bucket/filename`) under a folder.
    ///
    /// Fails with `PathTraversal` unless the result lies strictly inside
    /// `root/{folder}/`. `.` segments and repeated separators are ignored.
    pub fn resolve_path(&self, folder: Folder, relative: &str) -> Result<PathBuf> {
        let traversal = || FiledropError::PathTraversal(relative.to_string());

        if relative.contains('\0') || has_absolute_prefix(relative) {
            return Err(traversal());
        }

        let base = self.folder_root(folder);
        let mut resolved = base.clone();
        for segment in relative.split(is_separator) {
            match segment {
                "" | "." => continue,
                ".." => return Err(traversal()),
                segment => resolved.push(segment),
            }
        }

        if !is_within(&base, &resolved) {
            return Err(traversal());
        }

        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::FixedClock;
    use chrono::NaiveDate;

    fn resolver() -> PathResolver {
        PathResolver::new("/srv/filedrop")
    }

    #[test]
    fn test_sanitize_plain_name() {
        assert_eq!(sanitize_filename("traders.csv").unwrap(), "traders.csv");
        assert_eq!(sanitize_filename("  report.pdf ").unwrap(), "report.pdf");
    }

    #[test]
    fn test_sanitize_strips_directories() {
        assert_eq!(
            sanitize_filename("reports/2025/traders.csv").unwrap(),
            "traders.csv"
        );
        assert_eq!(sanitize_filename("reports\\traders.csv").unwrap(), "traders.csv");
    }

    #[test]
    fn test_sanitize_removes_control_characters() {
        assert_eq!(sanitize_filename("tra\r\nders.csv").unwrap(), "traders.csv");
    }

    #[test]
    fn test_sanitize_rejects_traversal() {
        for raw in ["../etc/passwd", "a/../../b.txt", "..\\secret.txt", "..", "x/.."] {
            assert!(
                matches!(sanitize_filename(raw), Err(FiledropError::InvalidName(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn test_sanitize_rejects_absolute() {
        for raw in ["/etc/passwd", "\\windows\\system.ini"] {
            assert!(
                matches!(sanitize_filename(raw), Err(FiledropError::InvalidName(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[cfg(windows)]
    #[test]
    fn test_sanitize_rejects_drive_letter() {
        for raw in ["C:\\boot.ini", "c:evil.txt"] {
            assert!(
                matches!(sanitize_filename(raw), Err(FiledropError::InvalidName(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[cfg(not(windows))]
    #[test]
    fn test_sanitize_keeps_colon_names() {
        assert_eq!(sanitize_filename("a:b.txt").unwrap(), "a:b.txt");
        assert_eq!(sanitize_filename("C:\\boot.ini").unwrap(), "boot.ini");
    }

    #[test]
    fn test_sanitize_length_limit() {
        let longest = format!("{}.csv", "a".repeat(MAX_FILENAME_BYTES - 4));
        assert_eq!(sanitize_filename(&longest).unwrap(), longest);

        let too_long = format!("{}.csv", "a".repeat(300));
        assert!(matches!(
            sanitize_filename(&too_long),
            Err(FiledropError::InvalidName(_))
        ));

        // counted in bytes, not chars
        let multibyte = "é".repeat(128);
        assert!(sanitize_filename(&multibyte).is_err());
    }

    #[test]
    fn test_sanitize_rejects_empty_and_hidden() {
        for raw in ["", "   ", ".", ".env", "dir/.hidden", "reports/", "\n"] {
            assert!(
                matches!(sanitize_filename(raw), Err(FiledropError::InvalidName(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_sanitize_allows_inner_dots() {
        assert_eq!(sanitize_filename("archive.tar.gz").unwrap(), "archive.tar.gz");
        assert_eq!(sanitize_filename("v1..2.txt").unwrap(), "v1..2.txt");
    }

    #[test]
    fn test_today_bucket() {
        let now = NaiveDate::from_ymd_opt(2025, 10, 15)
            .unwrap()
            .and_hms_opt(23, 59, 0)
            .unwrap();
        assert_eq!(today_bucket(&FixedClock::new(now)), "10-15-25");
    }

    #[test]
    fn test_is_within() {
        let base = Path::new("/srv/filedrop/uploads");
        assert!(is_within(base, Path::new("/srv/filedrop/uploads/10-15-25")));
        assert!(is_within(base, Path::new("/srv/filedrop/uploads/10-15-25/a.csv")));
        assert!(!is_within(base, base));
        assert!(!is_within(base, Path::new("/srv/filedrop/uploads2/a.csv")));
        assert!(!is_within(base, Path::new("/srv/filedrop/downloads/a.csv")));
    }

    #[test]
    fn test_resolve_bucket() {
        let path = resolver().resolve_path(Folder::Uploads, "10-15-25").unwrap();
        assert_eq!(path, Path::new("/srv/filedrop/uploads/10-15-25"));
    }

    #[test]
    fn test_resolve_bucket_and_file() {
        let path = resolver()
            .resolve_path(Folder::Downloads, "10-15-25/traders.csv")
            .unwrap();
        assert_eq!(path, Path::new("/srv/filedrop/downloads/10-15-25/traders.csv"));
    }

    #[test]
    fn test_resolve_ignores_dot_segments() {
        let path = resolver()
            .resolve_path(Folder::Downloads, "./10-15-25//traders.csv")
            .unwrap();
        assert_eq!(path, Path::new("/srv/filedrop/downloads/10-15-25/traders.csv"));
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        for relative in [
            "../uploads/10-15-25/a.csv",
            "10-15-25/../../secret",
            "..",
            "/etc/passwd",
            "\\etc\\passwd",
            "",
            ".",
            "a\0b",
        ] {
            assert!(
                matches!(
                    resolver().resolve_path(Folder::Uploads, relative),
                    Err(FiledropError::PathTraversal(_))
                ),
                "{relative:?} should be rejected"
            );
        }
    }
}
