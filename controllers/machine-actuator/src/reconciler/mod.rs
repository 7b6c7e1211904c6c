//! Machine reconciliation engine.
//!
//! One [`Reconciler`] serves every machine: it holds only the collaborator
//! handles, and each lifecycle operation takes the machine's
//! [`MachineScope`] explicitly. Operations are single-pass and idempotent;
//! retry cadence belongs to the caller.
//!
//! - `create`: NIC, then VM, then the `startupScript` extension
//! - `update`: immutable-field check against the observed VM
//! - `exists`: readiness probe plus providerID and nodeRef backfill
//! - `delete`: VM, then NIC
//! - `join`: control-plane join decision and bootstrap token minting
//! - `node_ref`: paginated node-identity resolution

mod create;
mod delete;
mod exists;
mod immutable;
mod join;
mod node_ref;
mod update;

#[cfg(test)]
mod exists_test;
#[cfg(test)]
mod node_ref_test;

pub use immutable::check_immutable_fields;

use crate::bootstrap_token::DEFAULT_BOOTSTRAP_TOKEN_TTL;
use crate::collaborators::{MachineRegistry, NodeInventory, StartupScriptRenderer, TokenIssuer};
use crate::scope::MachineScope;
use azure_services::{naming, NetworkInterfaceService, NetworkInterfaceSpec, VirtualMachineService, VmExtensionService};
use machine_api::MachineRole;
use std::sync::Arc;
use std::time::Duration;

/// Collaborators the reconciler orchestrates
#[derive(Clone)]
pub struct Services {
    pub virtual_machines: Arc<dyn VirtualMachineService>,
    pub network_interfaces: Arc<dyn NetworkInterfaceService>,
    pub extensions: Arc<dyn VmExtensionService>,
    pub tokens: Arc<dyn TokenIssuer>,
    pub nodes: Arc<dyn NodeInventory>,
    pub machines: Arc<dyn MachineRegistry>,
    pub scripts: Arc<dyn StartupScriptRenderer>,
}

/// Reconciles machines into Azure resources.
#[derive(Clone)]
pub struct Reconciler {
    pub(crate) services: Services,
    pub(crate) token_ttl: Duration,
}

impl Reconciler {
    pub fn new(services: Services) -> Self {
        Self {
            services,
            token_ttl: DEFAULT_BOOTSTRAP_TOKEN_TTL,
        }
    }

    /// Overrides the lifetime of minted bootstrap tokens.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

/// Network interface for a machine; subnet and load-balancer bindings
/// depend on its role.
pub fn network_interface_spec(scope: &MachineScope, role: MachineRole) -> NetworkInterfaceSpec {
    let cluster = scope.cluster().name.as_str();
    let mut spec = NetworkInterfaceSpec {
        name: naming::nic_name(scope.name()),
        vnet_name: naming::vnet_name(cluster),
        ..Default::default()
    };
    match role {
        MachineRole::Node => {
            spec.subnet_name = naming::node_subnet_name(cluster);
        }
        MachineRole::ControlPlane => {
            spec.subnet_name = naming::control_plane_subnet_name(cluster);
            spec.public_load_balancer_name = Some(naming::public_lb_name(cluster));
            spec.internal_load_balancer_name = Some(naming::internal_lb_name(cluster));
            // Every control-plane member shares NAT rule slot 0.
            spec.nat_rule = Some(0);
        }
    }
    spec
}

/// NIC spec used for teardown; only the name and vnet identify it.
pub(crate) fn network_interface_ref(scope: &MachineScope) -> NetworkInterfaceSpec {
    NetworkInterfaceSpec {
        name: naming::nic_name(scope.name()),
        vnet_name: naming::vnet_name(&scope.cluster().name),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_scope;

    #[test]
    fn test_node_interface_uses_node_subnet() {
        let scope = test_scope("worker-1", "node", true);
        let spec = network_interface_spec(&scope, MachineRole::Node);
        assert_eq!(spec.name, "worker-1-nic");
        assert_eq!(spec.vnet_name, "demo-vnet");
        assert_eq!(spec.subnet_name, "demo-node-subnet");
        assert_eq!(spec.public_load_balancer_name, None);
        assert_eq!(spec.nat_rule, None);
    }

    #[test]
    fn test_control_plane_interface_binds_load_balancers() {
        let scope = test_scope("cp-1", "controlplane", true);
        let spec = network_interface_spec(&scope, MachineRole::ControlPlane);
        assert_eq!(spec.subnet_name, "demo-controlplane-subnet");
        assert_eq!(spec.public_load_balancer_name.as_deref(), Some("demo-public-lb"));
        assert_eq!(spec.internal_load_balancer_name.as_deref(), Some("demo-internal-lb"));
        assert_eq!(spec.nat_rule, Some(0));
    }
}
