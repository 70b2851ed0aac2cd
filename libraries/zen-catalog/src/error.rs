//! Error types for catalog loading

use thiserror::Error;
use zen_backend::BackendError;

/// Shown when a load failure carries no message of its own
pub const DEFAULT_LOAD_ERROR: &str = "Failed to load meditations";

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Fetching categories or meditations failed
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl CatalogError {
    /// Text for the error banner
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            DEFAULT_LOAD_ERROR.to_string()
        } else {
            message
        }
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
