//! Azure service traits
//!
//! These traits abstract the Azure SDK clients so the reconciler can be
//! exercised against in-memory mocks. Every operation is expected to be
//! idempotent: repeating a create-or-update converges on the same resource,
//! and deleting an absent resource succeeds.

use crate::error::AzureError;
use crate::models::*;

/// Virtual machine operations
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait VirtualMachineService: Send + Sync {
    async fn create_or_update(&self, spec: &VirtualMachineSpec) -> Result<(), AzureError>;
    async fn get(&self, name: &str) -> Result<Lookup<VirtualMachine>, AzureError>;
    async fn delete(&self, name: &str) -> Result<(), AzureError>;
}

/// Network interface operations
#[async_trait::async_trait]
pub trait NetworkInterfaceService: Send + Sync {
    async fn create_or_update(&self, spec: &NetworkInterfaceSpec) -> Result<(), AzureError>;
    async fn delete(&self, spec: &NetworkInterfaceSpec) -> Result<(), AzureError>;
}

/// VM extension operations
#[async_trait::async_trait]
pub trait VmExtensionService: Send + Sync {
    async fn create_or_update(&self, spec: &VmExtensionSpec) -> Result<(), AzureError>;
    async fn get(&self, vm_name: &str, name: &str) -> Result<Lookup<VirtualMachineExtension>, AzureError>;
}
