//! Control-plane join decision
//!
//! Whether a control-plane machine initializes the cluster or joins it is
//! decided from the provisioned state of a peer, not from how many Machine
//! objects exist: a peer may be declared long before its VM is usable.

use super::Reconciler;
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use azure_services::{Lookup, naming};
use machine_api::MachineRole;
use tracing::debug;

impl Reconciler {
    /// Returns true when the machine joins an existing control plane.
    ///
    /// Workers always join and trigger no lookups. A control-plane machine
    /// probes the first other control-plane machine of its cluster: it joins
    /// only if that peer has both its VM and its startup extension.
    pub async fn is_node_join(&self, scope: &MachineScope) -> Result<bool, ActuatorError> {
        match scope.role()? {
            MachineRole::Node => Ok(true),
            MachineRole::ControlPlane => self.control_plane_peer_ready(scope).await,
        }
    }

    async fn control_plane_peer_ready(&self, scope: &MachineScope) -> Result<bool, ActuatorError> {
        let cluster = scope.cluster();
        let machines = self
            .services
            .machines
            .list_machines(&cluster.namespace)
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to retrieve machines in cluster {}", cluster.name), e))?;

        let peer = machines.iter().find(|m| {
            m.is_control_plane()
                && m.name != scope.name()
                && m.cluster_name.as_deref().is_none_or(|c| c == cluster.name)
        });
        let Some(peer) = peer else {
            debug!("Machine {} should join the control plane: false (no peers)", scope.name());
            return Ok(false);
        };

        let vm = self
            .services
            .virtual_machines
            .get(&peer.name)
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to verify existence of machine {}", peer.name), e))?;
        if let Lookup::NotFound = vm {
            debug!("Machine {} should join the control plane: false ({} has no VM)", scope.name(), peer.name);
            return Ok(false);
        }

        let extension = self
            .services
            .extensions
            .get(&peer.name, naming::STARTUP_EXTENSION_NAME)
            .await
            .map_err(|e| ActuatorError::provider(format!("failed to get startup extension of machine {}", peer.name), e))?;
        let join = extension.is_found();
        debug!("Machine {} should join the control plane: {}", scope.name(), join);
        Ok(join)
    }

    /// Mints a bootstrap token with the configured TTL.
    pub(crate) async fn issue_bootstrap_token(&self, scope: &MachineScope) -> Result<String, ActuatorError> {
        let credentials = scope.require_credentials()?;
        self.services
            .tokens
            .issue_bootstrap_token(credentials, self.token_ttl)
            .await
            .map_err(|e| ActuatorError::provider("failed to create new bootstrap token", e))
    }
}
