//! Main controller implementation.
//!
//! `Controller` wires the reconciler to the management cluster: it builds
//! the kube-backed collaborators, combines them with the Azure services and
//! script renderer supplied by the embedding binary, and runs the Machine
//! watcher until it stops or the process receives Ctrl-C.

use crate::config::ActuatorConfig;
use crate::collaborators::StartupScriptRenderer;
use crate::error::ActuatorError;
use crate::reconciler::{Reconciler, Services};
use crate::watcher::{Context, watch_machines};
use crate::workload::{KubeMachineRegistry, KubeWorkloadCluster};
use azure_services::{NetworkInterfaceService, VirtualMachineService, VmExtensionService};
use kube::{Api, Client};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Azure service handles supplied by the embedding binary
#[derive(Clone)]
pub struct AzureClients {
    pub virtual_machines: Arc<dyn VirtualMachineService>,
    pub network_interfaces: Arc<dyn NetworkInterfaceService>,
    pub extensions: Arc<dyn VmExtensionService>,
}

/// Machine actuator controller
pub struct Controller {
    machine_watcher: JoinHandle<Result<(), ActuatorError>>,
}

impl Controller {
    /// Connects to the management cluster and starts watching Machines.
    pub async fn new(
        config: ActuatorConfig,
        azure: AzureClients,
        scripts: Arc<dyn StartupScriptRenderer>,
    ) -> Result<Self, ActuatorError> {
        info!("Initializing machine actuator");
        info!("  Namespace: {}", config.namespace);
        info!("  Cluster: {}", config.cluster_name.as_deref().unwrap_or("from machine labels"));

        let client = Client::try_default().await?;
        Ok(Self::with_client(client, config, azure, scripts))
    }

    /// Same as [`new`](Self::new) with an existing client.
    pub fn with_client(
        client: Client,
        config: ActuatorConfig,
        azure: AzureClients,
        scripts: Arc<dyn StartupScriptRenderer>,
    ) -> Self {
        let workload = Arc::new(KubeWorkloadCluster::new(config.node_list_page_size));
        let reconciler = Reconciler::new(Services {
            virtual_machines: azure.virtual_machines,
            network_interfaces: azure.network_interfaces,
            extensions: azure.extensions,
            tokens: workload.clone(),
            nodes: workload,
            machines: Arc::new(KubeMachineRegistry::new(client.clone())),
            scripts,
        });

        let machines = Api::namespaced(client.clone(), &config.namespace);
        let secrets = Api::namespaced(client, &config.namespace);
        let ctx = Arc::new(Context::new(reconciler, machines, secrets, config));

        let machine_watcher = tokio::spawn(watch_machines(ctx));
        Self { machine_watcher }
    }

    /// Runs until the watcher exits or Ctrl-C is received.
    pub async fn run(self) -> Result<(), ActuatorError> {
        info!("Machine actuator running");

        tokio::select! {
            result = self.machine_watcher => {
                match result {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(e)) => {
                        error!("Machine watcher failed: {}", e);
                        Err(e)
                    }
                    Err(e) => {
                        error!("Machine watcher task panicked: {}", e);
                        Err(ActuatorError::Watch(format!("watcher task failed: {e}")))
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                warn!("Received shutdown signal, stopping machine actuator");
                Ok(())
            }
        }
    }
}
