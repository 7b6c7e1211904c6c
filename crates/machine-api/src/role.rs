//! Machine roles and well-known metadata keys

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Label carrying the machine role
pub const ROLE_LABEL: &str = "set";

/// Label carrying the owning cluster name
pub const CLUSTER_NAME_LABEL: &str = "cluster.k8s.io/cluster-name";

/// Annotation marking a machine as provisioned by this provider
pub const PROVIDER_ANNOTATION: &str = "cluster-api-provider-azure";

/// Finalizer held on a Machine until its cloud resources are gone
pub const MACHINE_FINALIZER: &str = "machine.cluster.k8s.io";

/// Role of a machine within its cluster
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash)]
pub enum MachineRole {
    /// Worker node; always joins an existing control plane
    #[serde(rename = "node")]
    Node,

    /// Control-plane member; initializes or joins
    #[serde(rename = "controlplane")]
    ControlPlane,
}

impl MachineRole {
    pub fn from_label(value: &str) -> Option<Self> {
        match value {
            "node" => Some(Self::Node),
            "controlplane" => Some(Self::ControlPlane),
            _ => None,
        }
    }

    pub fn as_label(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::ControlPlane => "controlplane",
        }
    }
}

impl std::fmt::Display for MachineRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_label())
    }
}
