//! Azure request specs and observed resource models

use crate::error::AzureError;
use machine_api::{Image, OsDisk, VmState};
use serde::{Deserialize, Serialize};

/// Desired network interface
///
/// Derived from the machine name and role on every pass; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NetworkInterfaceSpec {
    pub name: String,
    pub vnet_name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subnet_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_load_balancer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_load_balancer_name: Option<String>,
    /// Inbound NAT rule slot on the public load balancer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nat_rule: Option<u32>,
}

/// Desired virtual machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineSpec {
    pub name: String,
    pub nic_name: String,
    /// Decoded SSH public key
    pub ssh_key_data: String,
    pub size: String,
    pub os_disk: OsDisk,
    pub image: Image,
}

/// Desired VM extension running a startup script
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct VmExtensionSpec {
    pub name: String,
    pub vm_name: String,
    /// Base64-encoded script body
    pub script_data: String,
}

/// Observed virtual machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachine {
    /// Azure resource ID
    pub id: String,
    pub name: String,
    pub vm_size: String,
    pub provisioning_state: VmState,
}

/// Observed VM extension
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VirtualMachineExtension {
    pub id: String,
    pub name: String,
    pub vm_name: String,
    pub provisioning_state: VmState,
}

/// Result of a read that may legitimately find nothing
///
/// Absence is a valid answer, not an error: callers match on `NotFound`
/// instead of inspecting error variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Folds `AzureError::NotFound` into `Lookup::NotFound`; other errors pass through.
    pub fn from_result(result: Result<T, AzureError>) -> Result<Self, AzureError> {
        match result {
            Ok(value) => Ok(Self::Found(value)),
            Err(e) if e.is_not_found() => Ok(Self::NotFound),
            Err(e) => Err(e),
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }
}
