use super::{Reconciler, check_immutable_fields};
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use azure_services::Lookup;
use tracing::debug;

impl Reconciler {
    /// Verifies that an existing machine's desired spec is still
    /// compatible with its VM.
    ///
    /// Immutable fields are checked before anything else so a forbidden
    /// change is never hidden behind successful mutable updates. Tag
    /// convergence would follow the check; nothing is mutated today.
    pub async fn update(&self, scope: &mut MachineScope) -> Result<(), ActuatorError> {
        scope.role()?;

        let vm = match self
            .services
            .virtual_machines
            .get(scope.name())
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to get vm {}", scope.name()), e))?
        {
            Lookup::Found(vm) => vm,
            Lookup::NotFound => {
                return Err(ActuatorError::NotFound(format!("virtual machine {}", scope.name())));
            }
        };

        check_immutable_fields(scope.provider_spec(), &vm)?;
        debug!("Machine {} is up to date", scope.name());
        Ok(())
    }
}
