//! Deterministic Azure resource names.
//!
//! Every resource the actuator manages is named from the cluster or machine
//! name alone, so a later pass (or a different controller replica) always
//! addresses the same resources.

/// Fixed name of the startup-script extension on every VM.
pub const STARTUP_EXTENSION_NAME: &str = "startupScript";

/// Prefix of the provider ID recorded on a Machine.
pub const PROVIDER_ID_PREFIX: &str = "azure:////";

pub fn vnet_name(cluster_name: &str) -> String {
    format!("{cluster_name}-vnet")
}

pub fn node_subnet_name(cluster_name: &str) -> String {
    format!("{cluster_name}-node-subnet")
}

pub fn control_plane_subnet_name(cluster_name: &str) -> String {
    format!("{cluster_name}-controlplane-subnet")
}

pub fn public_lb_name(cluster_name: &str) -> String {
    format!("{cluster_name}-public-lb")
}

pub fn internal_lb_name(cluster_name: &str) -> String {
    format!("{cluster_name}-internal-lb")
}

pub fn nic_name(machine_name: &str) -> String {
    format!("{machine_name}-nic")
}

pub fn provider_id(vm_id: &str) -> String {
    format!("{PROVIDER_ID_PREFIX}{vm_id}")
}
