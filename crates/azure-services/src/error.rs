//! Azure service errors

use thiserror::Error;

/// Errors that can occur when calling an Azure service
#[derive(Debug, Error)]
pub enum AzureError {
    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Azure API returned an error
    #[error("Azure API error: {0}")]
    Api(String),

    /// Resource is locked or in a conflicting state (e.g. NIC still attached)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Authentication failed (expired credentials, missing role assignment, etc.)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Invalid request (e.g., missing required fields)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AzureError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
