//! Workload-cluster collaborator traits
//!
//! The reconciler reaches the cluster it is building through these traits:
//! minting join tokens, listing registered nodes, listing peer machines and
//! rendering the node startup script. `workload.rs` provides the
//! `kube`-backed implementations; tests use in-memory fakes.

use crate::error::{BoxError, ClusterError};
use crate::scope::{AdminCredentials, MachineScope};
use machine_api::{Machine, MachineRole};
use std::time::Duration;

/// A node as listed by the workload cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSummary {
    pub kind: String,
    pub api_version: String,
    pub name: String,
    /// `spec.providerID`, empty when the cloud provider has not set it yet
    pub provider_id: String,
}

/// One page of a node listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodePage {
    pub nodes: Vec<NodeSummary>,
    /// Token for the next page, `None` on the last page
    pub continue_token: Option<String>,
}

/// A machine as listed by the machine registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSummary {
    pub name: String,
    pub role_label: Option<String>,
    pub cluster_name: Option<String>,
}

impl MachineSummary {
    pub fn is_control_plane(&self) -> bool {
        self.role_label.as_deref().and_then(MachineRole::from_label) == Some(MachineRole::ControlPlane)
    }
}

impl From<&Machine> for MachineSummary {
    fn from(machine: &Machine) -> Self {
        Self {
            name: machine.metadata.name.clone().unwrap_or_default(),
            role_label: machine.role_label().map(str::to_string),
            cluster_name: machine.cluster_name().map(str::to_string),
        }
    }
}

/// Mints time-bounded join credentials.
#[async_trait::async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Returns a token of the form `<id>.<secret>` valid for `ttl`.
    async fn issue_bootstrap_token(
        &self,
        credentials: &AdminCredentials,
        ttl: Duration,
    ) -> Result<String, ClusterError>;
}

/// Paginated listing of registered cluster nodes.
#[async_trait::async_trait]
pub trait NodeInventory: Send + Sync {
    async fn list_nodes(
        &self,
        credentials: &AdminCredentials,
        continue_token: Option<&str>,
    ) -> Result<NodePage, ClusterError>;
}

/// Listing of all Machine objects known to the management cluster.
#[async_trait::async_trait]
pub trait MachineRegistry: Send + Sync {
    async fn list_machines(&self, namespace: &str) -> Result<Vec<MachineSummary>, ClusterError>;
}

/// Renders the node startup script run by the VM extension.
pub trait StartupScriptRenderer: Send + Sync {
    /// `bootstrap_token` is `Some` only for machines joining an existing
    /// control plane.
    fn render(&self, scope: &MachineScope, bootstrap_token: Option<&str>) -> Result<String, BoxError>;
}
