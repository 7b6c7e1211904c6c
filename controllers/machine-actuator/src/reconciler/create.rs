//! Machine creation

use super::{Reconciler, network_interface_spec};
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use azure_services::{VirtualMachineSpec, VmExtensionSpec, naming};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use machine_api::MachineRole;
use tracing::{info, warn};

impl Reconciler {
    /// Creates the machine's NIC, VM and startup extension, in that order.
    ///
    /// Joining control-plane members get a bootstrap token before any
    /// resource is touched. Every step is an upsert, so a failed pass can be
    /// retried from the start.
    pub async fn create(&self, scope: &mut MachineScope) -> Result<(), ActuatorError> {
        let role = scope.role()?;

        let join = self.is_node_join(scope).await?;
        let bootstrap_token = if join && role == MachineRole::ControlPlane {
            Some(self.issue_bootstrap_token(scope).await?)
        } else {
            None
        };

        let nic = network_interface_spec(scope, role);
        self.services
            .network_interfaces
            .create_or_update(&nic)
            .await
            .map_err(|e| ActuatorError::provider(format!("unable to create network interface {}", nic.name), e))?;

        let provider_spec = scope.provider_spec();
        let ssh_key_data = match STANDARD.decode(&provider_spec.ssh_public_key) {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(e) => {
                warn!("Failed to decode ssh public key for machine {}: {}", scope.name(), e);
                String::new()
            }
        };

        let vm = VirtualMachineSpec {
            name: scope.name().to_string(),
            nic_name: nic.name.clone(),
            ssh_key_data,
            size: provider_spec.vm_size.clone(),
            os_disk: provider_spec.os_disk.clone(),
            image: provider_spec.image.clone(),
        };
        self.services
            .virtual_machines
            .create_or_update(&vm)
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to create virtual machine {}", vm.name), e))?;

        let script = self
            .services
            .scripts
            .render(scope, bootstrap_token.as_deref())
            .map_err(|e| ActuatorError::provider(format!("failed to render startup script for {}", scope.name()), e))?;
        let extension = VmExtensionSpec {
            name: naming::STARTUP_EXTENSION_NAME.to_string(),
            vm_name: scope.name().to_string(),
            script_data: STANDARD.encode(script),
        };
        self.services
            .extensions
            .create_or_update(&extension)
            .await
            .map_err(|e| {
                ActuatorError::provider(
                    format!("failed to create {} extension on {}", extension.name, extension.vm_name),
                    e,
                )
            })?;

        scope.mark_provider_managed();
        info!("Created machine {} (role {}, join {})", scope.name(), role, join);
        Ok(())
    }
}
