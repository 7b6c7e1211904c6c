//! Azure provider spec and status
//!
//! Embedded in `Machine.spec.providerSpec.value` and
//! `Machine.status.providerStatus` respectively.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Desired Azure configuration for one machine.
///
/// Treated as immutable once the backing VM exists; `vmSize` is the only
/// field the actuator currently verifies.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineProviderSpec {
    /// Azure region
    #[serde(default)]
    pub location: String,

    /// VM size (e.g. "Standard_B2ms")
    pub vm_size: String,

    /// Marketplace image reference
    #[serde(default)]
    pub image: Image,

    /// OS disk configuration
    #[serde(default)]
    pub os_disk: OsDisk,

    /// Base64-encoded SSH public key
    #[serde(default)]
    pub ssh_public_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OsDisk {
    pub os_type: String,
    #[serde(default)]
    pub managed_disk: ManagedDisk,
    #[serde(rename = "diskSizeGB", default)]
    pub disk_size_gb: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDisk {
    pub storage_account_type: String,
}

/// Observed Azure state for one machine.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureMachineProviderStatus {
    /// Azure resource ID of the VM
    #[serde(default, rename = "vmId", skip_serializing_if = "Option::is_none")]
    pub vm_id: Option<String>,

    /// Last observed provisioning state
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_state: Option<VmState>,
}

/// VM provisioning state as reported by Azure
///
/// Serializes as PascalCase ("Succeeded", "Updating", ...), matching the
/// strings the compute API returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "PascalCase")]
pub enum VmState {
    Creating,
    Deleting,
    Failed,
    Succeeded,
    Updating,
    #[default]
    Unknown,
}

impl VmState {
    /// Maps a provider provisioning-state string. Unrecognized values are `Unknown`.
    pub fn from_provisioning_state(state: &str) -> Self {
        match state {
            "Creating" => Self::Creating,
            "Deleting" => Self::Deleting,
            "Failed" => Self::Failed,
            "Succeeded" => Self::Succeeded,
            "Updating" => Self::Updating,
            _ => Self::Unknown,
        }
    }

    /// Whether reconciliation may proceed past the existence check.
    pub fn is_ready(self) -> bool {
        matches!(self, Self::Succeeded | Self::Updating)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Creating => "Creating",
            Self::Deleting => "Deleting",
            Self::Failed => "Failed",
            Self::Succeeded => "Succeeded",
            Self::Updating => "Updating",
            Self::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for VmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
