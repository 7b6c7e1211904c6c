//! Kubernetes-backed collaborators.
//!
//! [`KubeWorkloadCluster`] talks to the workload cluster through its admin
//! kubeconfig; a fresh client is built for every call because each machine
//! pass may carry credentials for a different cluster.
//! [`KubeMachineRegistry`] lists Machines in the management cluster.

use crate::bootstrap_token::{BOOTSTRAP_TOKEN_NAMESPACE, BootstrapToken};
use crate::collaborators::{MachineRegistry, MachineSummary, NodeInventory, NodePage, NodeSummary, TokenIssuer};
use crate::config::DEFAULT_NODE_LIST_PAGE_SIZE;
use crate::error::ClusterError;
use crate::scope::AdminCredentials;
use k8s_openapi::api::core::v1::{Node, Secret};
use kube::api::{ListParams, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use machine_api::Machine;
use std::time::Duration;
use tracing::{debug, info};

/// Workload cluster reached through admin credentials
#[derive(Debug, Clone)]
pub struct KubeWorkloadCluster {
    page_size: u32,
}

impl Default for KubeWorkloadCluster {
    fn default() -> Self {
        Self::new(DEFAULT_NODE_LIST_PAGE_SIZE)
    }
}

impl KubeWorkloadCluster {
    pub fn new(page_size: u32) -> Self {
        Self { page_size }
    }

    async fn client(&self, credentials: &AdminCredentials) -> Result<Client, ClusterError> {
        let kubeconfig = Kubeconfig::from_yaml(credentials.kubeconfig())?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        Ok(Client::try_from(config)?)
    }
}

#[async_trait::async_trait]
impl TokenIssuer for KubeWorkloadCluster {
    async fn issue_bootstrap_token(
        &self,
        credentials: &AdminCredentials,
        ttl: Duration,
    ) -> Result<String, ClusterError> {
        let client = self.client(credentials).await?;
        let token = BootstrapToken::generate();
        let secret = token.to_secret(ttl, chrono::Utc::now())?;

        let secrets: Api<Secret> = Api::namespaced(client, BOOTSTRAP_TOKEN_NAMESPACE);
        secrets.create(&PostParams::default(), &secret).await?;

        info!("Issued bootstrap token {} valid for {}s", token.id(), ttl.as_secs());
        Ok(token.to_string())
    }
}

#[async_trait::async_trait]
impl NodeInventory for KubeWorkloadCluster {
    async fn list_nodes(
        &self,
        credentials: &AdminCredentials,
        continue_token: Option<&str>,
    ) -> Result<NodePage, ClusterError> {
        let client = self.client(credentials).await?;
        let nodes: Api<Node> = Api::all(client);

        let mut params = ListParams::default().limit(self.page_size);
        if let Some(token) = continue_token {
            params = params.continue_token(token);
        }
        let list = nodes.list(&params).await?;

        let page = NodePage {
            nodes: list
                .items
                .into_iter()
                .map(|node| NodeSummary {
                    kind: <Node as k8s_openapi::Resource>::KIND.to_string(),
                    api_version: <Node as k8s_openapi::Resource>::API_VERSION.to_string(),
                    name: node.metadata.name.unwrap_or_default(),
                    provider_id: node.spec.and_then(|s| s.provider_id).unwrap_or_default(),
                })
                .collect(),
            continue_token: list.metadata.continue_.filter(|t| !t.is_empty()),
        };
        debug!(
            "Listed {} nodes (more pages: {})",
            page.nodes.len(),
            page.continue_token.is_some()
        );
        Ok(page)
    }
}

/// Machine registry backed by the management cluster
#[derive(Clone)]
pub struct KubeMachineRegistry {
    client: Client,
}

impl KubeMachineRegistry {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl MachineRegistry for KubeMachineRegistry {
    async fn list_machines(&self, namespace: &str) -> Result<Vec<MachineSummary>, ClusterError> {
        let machines: Api<Machine> = Api::namespaced(self.client.clone(), namespace);
        let list = machines.list(&ListParams::default()).await?;
        Ok(list.items.iter().map(MachineSummary::from).collect())
    }
}
