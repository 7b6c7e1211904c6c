//! Machine CRD
//!
//! Desired state of a single cluster node. The provider-specific part of the
//! spec is carried in `providerSpec.value`; everything the actuator observes
//! in the cloud is reported back through `status`.

use crate::provider::{AzureMachineProviderSpec, AzureMachineProviderStatus};
use crate::references::NodeReference;
use crate::role::{CLUSTER_NAME_LABEL, MachineRole, ROLE_LABEL};
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
#[kube(
    group = "cluster.k8s.io",
    version = "v1alpha1",
    kind = "Machine",
    namespaced,
    status = "MachineStatus"
)]
#[serde(rename_all = "camelCase")]
pub struct MachineSpec {
    /// Provider-specific configuration
    #[serde(default)]
    pub provider_spec: ProviderSpec,

    /// Identifier assigned by the infrastructure provider once the VM exists
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSpec {
    /// Azure machine configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<AzureMachineProviderSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MachineStatus {
    /// Cluster node registered for this machine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_ref: Option<NodeReference>,

    /// Observed Azure state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<AzureMachineProviderStatus>,

    /// Error message from the last failed reconciliation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Machine {
    /// Value of the `set` role label, if present.
    pub fn role_label(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(ROLE_LABEL))
            .map(String::as_str)
    }

    /// Parsed role, `None` when the label is missing or unrecognized.
    pub fn role(&self) -> Option<MachineRole> {
        self.role_label().and_then(MachineRole::from_label)
    }

    /// Name of the owning cluster, taken from the cluster-name label.
    pub fn cluster_name(&self) -> Option<&str> {
        self.metadata
            .labels
            .as_ref()
            .and_then(|labels| labels.get(CLUSTER_NAME_LABEL))
            .map(String::as_str)
    }

    pub fn is_control_plane(&self) -> bool {
        self.role() == Some(MachineRole::ControlPlane)
    }
}
