//! Existence and readiness probe

use super::Reconciler;
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use azure_services::{Lookup, naming};
use tracing::{info, warn};

impl Reconciler {
    /// Reports whether the machine exists and is ready to be updated.
    ///
    /// A VM counts only together with its startup extension. Once the VM is
    /// `Succeeded` or `Updating`, the providerID is backfilled and the node
    /// reference resolved; failing to find the node is logged, not returned,
    /// since the node may simply not have registered yet.
    pub async fn exists(&self, scope: &mut MachineScope) -> Result<bool, ActuatorError> {
        if !self.vm_exists(scope).await? {
            return Ok(false);
        }

        let Some(state) = scope.vm_state().filter(|s| s.is_ready()) else {
            return Ok(false);
        };
        let vm_id = scope.vm_id().unwrap_or_default().to_string();
        info!("Machine {} is {}", vm_id, state);

        if scope.provider_id().is_none_or(str::is_empty) {
            scope.set_provider_id(naming::provider_id(&vm_id));
        }

        if scope.node_ref().is_none() {
            match self.resolve_node_ref(scope).await {
                Ok(node_ref) => {
                    info!("Setting machine {} nodeRef to {}", scope.name(), node_ref.name);
                    scope.set_node_ref(node_ref);
                }
                Err(e) => warn!("Failed to set nodeRef for machine {}: {}", scope.name(), e),
            }
        }

        Ok(true)
    }

    /// Looks up the VM and its startup extension, recording the VM's id and
    /// provisioning state when both exist.
    async fn vm_exists(&self, scope: &mut MachineScope) -> Result<bool, ActuatorError> {
        let vm = match self
            .services
            .virtual_machines
            .get(scope.name())
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to get vm {}", scope.name()), e))?
        {
            Lookup::Found(vm) => vm,
            Lookup::NotFound => return Ok(false),
        };
        info!("Found vm for machine {}", scope.name());

        let extension = self
            .services
            .extensions
            .get(scope.name(), naming::STARTUP_EXTENSION_NAME)
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to get vm extension of {}", scope.name()), e))?;
        if !extension.is_found() {
            return Ok(false);
        }

        scope.record_vm(vm.id, vm.provisioning_state);
        Ok(true)
    }
}
