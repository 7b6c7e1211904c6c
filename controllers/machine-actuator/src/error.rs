//! Actuator error types.
//!
//! `ActuatorError` is the classification every lifecycle operation returns.
//! Callers use [`ActuatorError::is_terminal`] to tell "not ready yet, try
//! again" apart from "will never succeed without operator intervention".

use thiserror::Error;

/// Boxed source error carried by [`ActuatorError::Provider`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while reconciling a machine.
#[derive(Debug, Error)]
pub enum ActuatorError {
    /// Unknown or missing role label, missing admin credentials, bad settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A resource the operation requires does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// An external service call failed
    #[error("{context}: {source}")]
    Provider {
        context: String,
        #[source]
        source: BoxError,
    },

    /// Update detected a change to a field that cannot change in place
    #[error("Attempt to change immutable state: {0}")]
    ImmutableViolation(String),

    /// No cluster node matches the machine's VM
    #[error("Node resolution failed: {0}")]
    ResolutionFailure(String),

    /// Kubernetes API error in the controller shell
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),
}

impl ActuatorError {
    /// Wraps an external-call failure with the operation context.
    pub fn provider(context: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Provider {
            context: context.into(),
            source: source.into(),
        }
    }

    /// True when retrying with the same input cannot succeed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::ImmutableViolation(_))
    }
}

/// Errors from the workload cluster collaborators (token issuer, node
/// inventory, machine registry).
#[derive(Debug, Error)]
pub enum ClusterError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// Admin kubeconfig could not be loaded
    #[error("Invalid kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    /// Request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Cluster could not be reached or refused the request
    #[error("Cluster unavailable: {0}")]
    Unavailable(String),
}
