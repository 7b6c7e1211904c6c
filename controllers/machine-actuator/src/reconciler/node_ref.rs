//! Node-identity resolution

use super::Reconciler;
use crate::error::ActuatorError;
use crate::scope::MachineScope;
use machine_api::NodeReference;
use tracing::debug;

impl Reconciler {
    /// Finds the workload-cluster node backing this machine's VM.
    ///
    /// Pages through the node inventory until a node's providerID contains
    /// the VM id. Substring matching mirrors how Azure provider IDs embed the
    /// resource id; it can match a longer id sharing the same prefix.
    pub async fn resolve_node_ref(&self, scope: &MachineScope) -> Result<NodeReference, ActuatorError> {
        let vm_id = scope
            .vm_id()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ActuatorError::Configuration(format!("instance id is empty for machine {}", scope.name())))?;
        let credentials = scope.require_credentials()?;

        let mut continue_token: Option<String> = None;
        let mut pages = 0usize;
        loop {
            let page = self
                .services
                .nodes
                .list_nodes(credentials, continue_token.as_deref())
                .await
                .map_err(|e| ActuatorError::provider("failed to query cluster nodes", e))?;
            pages += 1;

            if let Some(node) = page.nodes.into_iter().find(|n| n.provider_id.contains(vm_id)) {
                debug!("Matched node {} for machine {} after {} page(s)", node.name, scope.name(), pages);
                return Ok(NodeReference::new(node.kind, node.api_version, node.name));
            }

            match page.continue_token.filter(|t| !t.is_empty()) {
                Some(token) => continue_token = Some(token),
                None => break,
            }
        }

        Err(ActuatorError::ResolutionFailure(format!(
            "no node found for machine {} after {} page(s)",
            scope.name(),
            pages
        )))
    }
}
