use super::{Reconciler, network_interface_ref};
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use tracing::info;

impl Reconciler {
    /// Deletes the VM, then its network interface.
    ///
    /// The NIC stays in place when VM deletion fails; a VM holds its NIC, so
    /// deleting the NIC first would fail or orphan it.
    pub async fn delete(&self, scope: &mut MachineScope) -> Result<(), ActuatorError> {
        self.services
            .virtual_machines
            .delete(scope.name())
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to delete machine {}", scope.name()), e))?;

        let nic = network_interface_ref(scope);
        self.services
            .network_interfaces
            .delete(&nic)
            .await
            .map_err(|e| ActuatorError::provider(format!("unable to delete network interface {}", nic.name), e))?;

        info!("Deleted machine {}", scope.name());
        Ok(())
    }
}
