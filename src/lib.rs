//! filedrop - date-bucketed HTTP file exchange
//!
//! Clients push files into `uploads/` and pull files staged in `downloads/`.
//! Every file lands in a bucket named after the server's local date
//! (`MM-DD-YY`), and "today's downloads" is whatever the current bucket holds.

pub mod client;
pub mod config;
pub mod datetime;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use client::{Client, PushReport};
pub use config::Config;
pub use datetime::{Clock, FixedClock, SystemClock};
pub use error::{FiledropError, Result};
pub use storage::{todays_downloads, DownloadOutcome, Folder, PathResolver, Repository, StoredFile};
pub use web::WebServer;
