//! API handlers.

pub mod files;
pub mod health;

pub use files::*;
pub use health::*;

use std::sync::Arc;

use crate::storage::Repository;
use crate::web::error::ApiError;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Date-bucketed file repository.
    pub repository: Arc<Repository>,
    /// Service name reported by the status endpoints.
    pub service_name: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(repository: Arc<Repository>) -> Self {
        Self {
            repository,
            service_name: "filedrop".to_string(),
        }
    }

    /// Set the service name.
    pub fn with_service_name(mut self, name: impl Into<String>) -> Self {
        self.service_name = name.into();
        self
    }

    /// Run a repository operation on the blocking thread pool.
    pub async fn with_repository<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Repository) -> crate::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let repository = self.repository.clone();
        tokio::task::spawn_blocking(move || op(&repository))
            .await
            .map_err(|e| {
                tracing::error!("Storage task failed: {}", e);
                ApiError::internal("Internal server error")
            })?
            .map_err(ApiError::from)
    }
}
