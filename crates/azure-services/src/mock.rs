//! Mock Azure services for unit testing
//!
//! This module provides an in-memory implementation of all three service
//! traits that can be used in unit tests without an Azure subscription.
//! Resources are keyed by name, so repeated create-or-update calls never
//! produce duplicates. Every call is appended to an ordered log and any
//! operation can be configured to fail.

use crate::error::AzureError;
use crate::models::*;
use crate::services_trait::{NetworkInterfaceService, VirtualMachineService, VmExtensionService};
use machine_api::VmState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Operation kinds recorded by the mock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOperation {
    NicCreateOrUpdate,
    NicDelete,
    VmCreateOrUpdate,
    VmGet,
    VmDelete,
    ExtensionCreateOrUpdate,
    ExtensionGet,
}

/// One recorded service call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
    pub operation: MockOperation,
    /// Resource name (for extensions: "<vm>/<extension>")
    pub resource: String,
}

impl ServiceCall {
    pub fn new(operation: MockOperation, resource: impl Into<String>) -> Self {
        Self {
            operation,
            resource: resource.into(),
        }
    }
}

/// Mock Azure services for testing
///
/// Cloning shares the underlying state, so a test can hand one clone to the
/// reconciler and inspect another.
#[derive(Clone, Default)]
pub struct MockAzureServices {
    vms: Arc<Mutex<HashMap<String, VirtualMachine>>>,
    vm_specs: Arc<Mutex<HashMap<String, VirtualMachineSpec>>>,
    nics: Arc<Mutex<HashMap<String, NetworkInterfaceSpec>>>,
    extensions: Arc<Mutex<HashMap<(String, String), VirtualMachineExtension>>>,
    extension_specs: Arc<Mutex<HashMap<(String, String), VmExtensionSpec>>>,
    failures: Arc<Mutex<HashMap<MockOperation, String>>>,
    calls: Arc<Mutex<Vec<ServiceCall>>>,
}

impl MockAzureServices {
    /// Create a new, empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Azure resource ID the mock assigns to a VM
    pub fn vm_id(name: &str) -> String {
        format!("/subscriptions/mock/resourceGroups/mock/providers/Microsoft.Compute/virtualMachines/{name}")
    }

    /// Add an existing VM (for test setup)
    pub fn add_vm(&self, name: &str, vm_size: &str, state: VmState) {
        self.vms.lock().unwrap().insert(
            name.to_string(),
            VirtualMachine {
                id: Self::vm_id(name),
                name: name.to_string(),
                vm_size: vm_size.to_string(),
                provisioning_state: state,
            },
        );
    }

    /// Add an existing extension (for test setup)
    pub fn add_extension(&self, vm_name: &str, name: &str) {
        self.extensions.lock().unwrap().insert(
            (vm_name.to_string(), name.to_string()),
            VirtualMachineExtension {
                id: format!("{}/extensions/{name}", Self::vm_id(vm_name)),
                name: name.to_string(),
                vm_name: vm_name.to_string(),
                provisioning_state: VmState::Succeeded,
            },
        );
    }

    /// Add an existing network interface (for test setup)
    pub fn add_nic(&self, spec: NetworkInterfaceSpec) {
        self.nics.lock().unwrap().insert(spec.name.clone(), spec);
    }

    /// Change the provisioning state of an existing VM
    pub fn set_vm_state(&self, name: &str, state: VmState) {
        if let Some(vm) = self.vms.lock().unwrap().get_mut(name) {
            vm.provisioning_state = state;
        }
    }

    /// Make every subsequent call of `operation` fail with an API error
    pub fn fail_operation(&self, operation: MockOperation, message: impl Into<String>) {
        self.failures.lock().unwrap().insert(operation, message.into());
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    pub fn vm(&self, name: &str) -> Option<VirtualMachine> {
        self.vms.lock().unwrap().get(name).cloned()
    }

    /// Last spec applied to a VM
    pub fn vm_spec(&self, name: &str) -> Option<VirtualMachineSpec> {
        self.vm_specs.lock().unwrap().get(name).cloned()
    }

    pub fn nic(&self, name: &str) -> Option<NetworkInterfaceSpec> {
        self.nics.lock().unwrap().get(name).cloned()
    }

    /// Last spec applied to an extension
    pub fn extension_spec(&self, vm_name: &str, name: &str) -> Option<VmExtensionSpec> {
        self.extension_specs
            .lock()
            .unwrap()
            .get(&(vm_name.to_string(), name.to_string()))
            .cloned()
    }

    pub fn vm_count(&self) -> usize {
        self.vms.lock().unwrap().len()
    }

    pub fn nic_count(&self) -> usize {
        self.nics.lock().unwrap().len()
    }

    pub fn extension_count(&self) -> usize {
        self.extensions.lock().unwrap().len()
    }

    /// All calls in the order they were made
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Operations only, in call order
    pub fn operations(&self) -> Vec<MockOperation> {
        self.calls.lock().unwrap().iter().map(|c| c.operation).collect()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, operation: MockOperation, resource: &str) -> Result<(), AzureError> {
        self.calls
            .lock()
            .unwrap()
            .push(ServiceCall::new(operation, resource));
        match self.failures.lock().unwrap().get(&operation) {
            Some(message) => Err(AzureError::Api(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl NetworkInterfaceService for MockAzureServices {
    async fn create_or_update(&self, spec: &NetworkInterfaceSpec) -> Result<(), AzureError> {
        self.record(MockOperation::NicCreateOrUpdate, &spec.name)?;
        self.nics.lock().unwrap().insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn delete(&self, spec: &NetworkInterfaceSpec) -> Result<(), AzureError> {
        self.record(MockOperation::NicDelete, &spec.name)?;
        let attached = self
            .vm_specs
            .lock()
            .unwrap()
            .values()
            .any(|vm| vm.nic_name == spec.name);
        if attached {
            return Err(AzureError::Conflict(format!(
                "network interface {} is attached to a virtual machine",
                spec.name
            )));
        }
        self.nics.lock().unwrap().remove(&spec.name);
        Ok(())
    }
}

#[async_trait::async_trait]
impl VirtualMachineService for MockAzureServices {
    async fn create_or_update(&self, spec: &VirtualMachineSpec) -> Result<(), AzureError> {
        self.record(MockOperation::VmCreateOrUpdate, &spec.name)?;
        if !self.nics.lock().unwrap().contains_key(&spec.nic_name) {
            return Err(AzureError::InvalidRequest(format!(
                "network interface {} does not exist",
                spec.nic_name
            )));
        }
        self.vms.lock().unwrap().insert(
            spec.name.clone(),
            VirtualMachine {
                id: Self::vm_id(&spec.name),
                name: spec.name.clone(),
                vm_size: spec.size.clone(),
                provisioning_state: VmState::Succeeded,
            },
        );
        self.vm_specs.lock().unwrap().insert(spec.name.clone(), spec.clone());
        Ok(())
    }

    async fn get(&self, name: &str) -> Result<Lookup<VirtualMachine>, AzureError> {
        self.record(MockOperation::VmGet, name)?;
        Ok(match self.vms.lock().unwrap().get(name) {
            Some(vm) => Lookup::Found(vm.clone()),
            None => Lookup::NotFound,
        })
    }

    async fn delete(&self, name: &str) -> Result<(), AzureError> {
        self.record(MockOperation::VmDelete, name)?;
        self.vms.lock().unwrap().remove(name);
        self.vm_specs.lock().unwrap().remove(name);
        self.extensions.lock().unwrap().retain(|(vm, _), _| vm != name);
        self.extension_specs.lock().unwrap().retain(|(vm, _), _| vm != name);
        Ok(())
    }
}

#[async_trait::async_trait]
impl VmExtensionService for MockAzureServices {
    async fn create_or_update(&self, spec: &VmExtensionSpec) -> Result<(), AzureError> {
        self.record(
            MockOperation::ExtensionCreateOrUpdate,
            &format!("{}/{}", spec.vm_name, spec.name),
        )?;
        if !self.vms.lock().unwrap().contains_key(&spec.vm_name) {
            return Err(AzureError::NotFound(format!("virtual machine {}", spec.vm_name)));
        }
        self.add_extension(&spec.vm_name, &spec.name);
        self.extension_specs
            .lock()
            .unwrap()
            .insert((spec.vm_name.clone(), spec.name.clone()), spec.clone());
        Ok(())
    }

    async fn get(&self, vm_name: &str, name: &str) -> Result<Lookup<VirtualMachineExtension>, AzureError> {
        self.record(MockOperation::ExtensionGet, &format!("{vm_name}/{name}"))?;
        Ok(
            match self
                .extensions
                .lock()
                .unwrap()
                .get(&(vm_name.to_string(), name.to_string()))
            {
                Some(ext) => Lookup::Found(ext.clone()),
                None => Lookup::NotFound,
            },
        )
    }
}
