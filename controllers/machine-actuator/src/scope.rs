//! Machine scope: the caller-owned context for one reconciliation pass.
//!
//! The scope carries the desired machine, its cluster identity and admin
//! credentials (read-only), plus the observed fields the reconciler is
//! allowed to write:
//!
//! - `providerStatus.vmId` / `providerStatus.vmState`
//! - `spec.providerID` (one-time backfill)
//! - `status.nodeRef` (one-time resolution)
//! - the provider-managed annotation
//!
//! Only one pass may hold a given machine's scope at a time.

use crate::error::ActuatorError;
use machine_api::{
    AzureMachineProviderSpec, AzureMachineProviderStatus, Machine, MachineRole, MachineStatus,
    NodeReference, PROVIDER_ANNOTATION, VmState,
};

/// Identity of the cluster a machine belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIdentity {
    pub name: String,
    /// Namespace holding the cluster's Machine objects
    pub namespace: String,
}

impl ClusterIdentity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

/// Administrative credentials for the workload cluster
#[derive(Clone)]
pub struct AdminCredentials {
    kubeconfig: String,
}

impl AdminCredentials {
    pub fn new(kubeconfig: impl Into<String>) -> Self {
        Self {
            kubeconfig: kubeconfig.into(),
        }
    }

    /// Admin kubeconfig as YAML
    pub fn kubeconfig(&self) -> &str {
        &self.kubeconfig
    }
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("kubeconfig", &"<redacted>")
            .finish()
    }
}

/// Per-pass machine context
#[derive(Debug, Clone)]
pub struct MachineScope {
    name: String,
    machine: Machine,
    provider_spec: AzureMachineProviderSpec,
    provider_status: AzureMachineProviderStatus,
    cluster: ClusterIdentity,
    credentials: Option<AdminCredentials>,
}

impl MachineScope {
    /// Builds a scope from a Machine object.
    ///
    /// Fails with `Configuration` when the machine has no name or no Azure
    /// provider spec.
    pub fn new(
        machine: Machine,
        cluster: ClusterIdentity,
        credentials: Option<AdminCredentials>,
    ) -> Result<Self, ActuatorError> {
        let name = machine
            .metadata
            .name
            .clone()
            .ok_or_else(|| ActuatorError::Configuration("Machine missing name".to_string()))?;
        let provider_spec = machine.spec.provider_spec.value.clone().ok_or_else(|| {
            ActuatorError::Configuration(format!("Machine {name} has no Azure provider spec"))
        })?;
        let provider_status = machine
            .status
            .as_ref()
            .and_then(|status| status.provider_status.clone())
            .unwrap_or_default();

        Ok(Self {
            name,
            machine,
            provider_spec,
            provider_status,
            cluster,
            credentials,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn provider_spec(&self) -> &AzureMachineProviderSpec {
        &self.provider_spec
    }

    pub fn provider_status(&self) -> &AzureMachineProviderStatus {
        &self.provider_status
    }

    pub fn cluster(&self) -> &ClusterIdentity {
        &self.cluster
    }

    pub fn credentials(&self) -> Option<&AdminCredentials> {
        self.credentials.as_ref()
    }

    /// Credentials, or a `Configuration` error naming the cluster.
    pub fn require_credentials(&self) -> Result<&AdminCredentials, ActuatorError> {
        self.credentials.as_ref().ok_or_else(|| {
            ActuatorError::Configuration(format!(
                "no admin kubeconfig available for cluster {}",
                self.cluster.name
            ))
        })
    }

    /// Parsed role; unknown or missing labels are a `Configuration` error.
    pub fn role(&self) -> Result<MachineRole, ActuatorError> {
        let label = self.machine.role_label().unwrap_or_default();
        MachineRole::from_label(label).ok_or_else(|| {
            ActuatorError::Configuration(format!(
                "Unknown value {label:?} for label `set` on machine {}",
                self.name
            ))
        })
    }

    pub fn vm_id(&self) -> Option<&str> {
        self.provider_status.vm_id.as_deref()
    }

    pub fn vm_state(&self) -> Option<VmState> {
        self.provider_status.vm_state
    }

    pub fn provider_id(&self) -> Option<&str> {
        self.machine.spec.provider_id.as_deref()
    }

    pub fn node_ref(&self) -> Option<&NodeReference> {
        self.machine.status.as_ref().and_then(|s| s.node_ref.as_ref())
    }

    pub fn is_provider_managed(&self) -> bool {
        self.machine
            .metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(PROVIDER_ANNOTATION))
            .is_some_and(|v| v == "true")
    }

    /// Machine with the provider status folded back into `status`.
    pub fn to_machine(&self) -> Machine {
        let mut machine = self.machine.clone();
        machine
            .status
            .get_or_insert_with(MachineStatus::default)
            .provider_status = Some(self.provider_status.clone());
        machine
    }

    pub(crate) fn record_vm(&mut self, vm_id: String, state: VmState) {
        self.provider_status.vm_id = Some(vm_id);
        self.provider_status.vm_state = Some(state);
    }

    pub(crate) fn set_provider_id(&mut self, provider_id: String) {
        self.machine.spec.provider_id = Some(provider_id);
    }

    pub(crate) fn set_node_ref(&mut self, node_ref: NodeReference) {
        self.machine
            .status
            .get_or_insert_with(MachineStatus::default)
            .node_ref = Some(node_ref);
    }

    pub(crate) fn mark_provider_managed(&mut self) {
        self.machine
            .metadata
            .annotations
            .get_or_insert_with(Default::default)
            .insert(PROVIDER_ANNOTATION.to_string(), "true".to_string());
    }
}
