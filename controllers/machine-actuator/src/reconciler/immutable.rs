//! Immutable-field drift check

use crate::error::ActuatorError;
use azure_services::VirtualMachine;
use machine_api::AzureMachineProviderSpec;

/// Fails on the first field that differs between the desired spec and the
/// observed VM but cannot change in place.
pub fn check_immutable_fields(
    desired: &AzureMachineProviderSpec,
    observed: &VirtualMachine,
) -> Result<(), ActuatorError> {
    if desired.vm_size != observed.vm_size {
        return Err(ActuatorError::ImmutableViolation(format!(
            "vmSize of {} cannot change from {} to {}",
            observed.name, observed.vm_size, desired.vm_size
        )));
    }
    Ok(())
}
