//! Web API module for filedrop.
//!
//! Thin HTTP layer over [`crate::storage::Repository`]: every JSON body
//! carries `success`, failures carry `error`.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use router::create_router;
pub use server::WebServer;
