//! Error types for the folder view subsystem

use thiserror::Error;

/// Result type alias for folder view operations
pub type FolderViewResult<T> = std::result::Result<T, FolderViewError>;

/// Errors that can occur while shaping queries or partitioning results
#[derive(Debug, Error)]
pub enum FolderViewError {
    /// The result payload carries no hierarchical facet for the folder field
    #[error("Folder facet not found in results: {field}")]
    FacetNotFound {
        /// Cleaned folder facet field that was looked up
        field: String,
    },

    /// Options failed validation (empty field, unusable delimiter, ...)
    #[error("Invalid folder view configuration: {0}")]
    InvalidConfig(String),

    /// The toggle was clicked on a navigator configured without one
    #[error("Folder view toggle is disabled for this navigator")]
    ToggleDisabled,

    /// A lifecycle hook was invoked out of order
    #[error("Invalid navigator state: {0}")]
    InvalidState(String),
}

impl FolderViewError {
    /// Returns the error type string (for JSON responses)
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::FacetNotFound { .. } => "FACET_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ToggleDisabled => "TOGGLE_DISABLED",
            Self::InvalidState(_) => "INVALID_STATE",
        }
    }
}
