//! Azure Machine Actuator
//!
//! Reconciles Cluster API `Machine` objects into Azure compute resources:
//! a network interface, a virtual machine and a `startupScript` extension
//! that bootstraps the node. Control-plane machines decide whether they
//! initialize a new cluster or join an existing one by probing the
//! provisioned state of a peer.
//!
//! The lifecycle operations live on [`Reconciler`]; each is a single,
//! idempotent pass over a caller-owned [`MachineScope`]. [`Controller`]
//! drives those passes from a Kubernetes watch with per-machine backoff.

pub mod backoff;
pub mod bootstrap_token;
pub mod collaborators;
pub mod config;
pub mod controller;
pub mod error;
pub mod reconciler;
pub mod scope;
pub mod watcher;
pub mod workload;

#[cfg(test)]
pub(crate) mod test_utils;

pub use bootstrap_token::{BootstrapToken, DEFAULT_BOOTSTRAP_TOKEN_TTL};
pub use collaborators::{
    MachineRegistry, MachineSummary, NodeInventory, NodePage, NodeSummary, StartupScriptRenderer,
    TokenIssuer,
};
pub use config::ActuatorConfig;
pub use controller::{AzureClients, Controller};
pub use error::{ActuatorError, BoxError, ClusterError};
pub use reconciler::{Reconciler, Services};
pub use scope::{AdminCredentials, ClusterIdentity, MachineScope};
pub use workload::{KubeMachineRegistry, KubeWorkloadCluster};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once is harmless; later calls leave the first subscriber in place.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
