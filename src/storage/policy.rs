//! Selection of "today's" downloads.

use super::{Folder, Repository, StoredFile};
use crate::Result;

/// What today's downloads bucket holds at the moment it is read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    /// Nothing to hand out.
    Empty {
        /// Bucket that was inspected.
        bucket: String,
    },
    /// Exactly one file; callers stream it directly.
    Single(StoredFile),
    /// Several files; callers return a listing with retrieval references.
    Multiple {
        /// Bucket that was inspected.
        bucket: String,
        /// Files sorted by filename.
        files: Vec<StoredFile>,
    },
}

/// Inspect today's downloads bucket.
///
/// The decision is based on a single directory read; files added afterwards
/// are not reflected.
pub fn todays_downloads(repo: &Repository) -> Result<DownloadOutcome> {
    let bucket = repo.today_bucket();
    let mut files = repo.list_bucket(Folder::Downloads.as_str(), &bucket)?;

    let outcome = if files.len() > 1 {
        DownloadOutcome::Multiple { bucket, files }
    } else {
        match files.pop() {
            Some(file) => DownloadOutcome::Single(file),
            None => DownloadOutcome::Empty { bucket },
        }
    };

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::{Clock, FixedClock};
    use chrono::NaiveDate;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn setup_repository() -> (TempDir, Repository) {
        let now = NaiveDate::from_ymd_opt(2025, 10, 15)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let clock: Arc<dyn Clock> = Arc::new(FixedClock::new(now));
        let temp_dir = TempDir::new().unwrap();
        let repo = Repository::open(temp_dir.path(), clock).unwrap();
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_when_no_bucket() {
        let (_temp_dir, repo) = setup_repository();

        let outcome = todays_downloads(&repo).unwrap();

        assert_eq!(
            outcome,
            DownloadOutcome::Empty {
                bucket: "10-15-25".to_string()
            }
        );
    }

    #[test]
    fn test_uploads_do_not_count() {
        let (_temp_dir, repo) = setup_repository();
        repo.store("uploads", "traders.csv", b"x").unwrap();

        let outcome = todays_downloads(&repo).unwrap();

        assert!(matches!(outcome, DownloadOutcome::Empty { .. }));
    }

    #[test]
    fn test_single() {
        let (_temp_dir, repo) = setup_repository();
        repo.store("downloads", "traders.csv", b"x").unwrap();

        match todays_downloads(&repo).unwrap() {
            DownloadOutcome::Single(file) => {
                assert_eq!(file.filename, "traders.csv");
                assert_eq!(file.reference(), "downloads/10-15-25/traders.csv");
            }
            other => panic!("expected Single, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_sorted_by_filename() {
        let (_temp_dir, repo) = setup_repository();
        repo.store("downloads", "b.csv", b"b").unwrap();
        repo.store("downloads", "a.csv", b"a").unwrap();
        repo.store("downloads", "c.csv", b"c").unwrap();

        match todays_downloads(&repo).unwrap() {
            DownloadOutcome::Multiple { bucket, files } => {
                assert_eq!(bucket, "10-15-25");
                let names: Vec<_> = files.iter().map(|f| f.filename.as_str()).collect();
                assert_eq!(names, vec!["a.csv", "b.csv", "c.csv"]);
            }
            other => panic!("expected Multiple, got {other:?}"),
        }
    }

    #[test]
    fn test_other_days_are_ignored() {
        let (_temp_dir, repo) = setup_repository();
        let yesterday = repo.root().join("downloads/10-14-25");
        std::fs::create_dir_all(&yesterday).unwrap();
        std::fs::write(yesterday.join("old.csv"), b"old").unwrap();

        assert!(matches!(
            todays_downloads(&repo).unwrap(),
            DownloadOutcome::Empty { .. }
        ));
    }
}
