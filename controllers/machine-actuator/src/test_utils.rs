//! Test utilities for unit testing the reconciler
//!
//! In-memory stand-ins for the workload-cluster collaborators plus builders
//! for machines and scopes. Azure is covered by `MockAzureServices`.

use crate::collaborators::{
    MachineRegistry, MachineSummary, NodeInventory, NodePage, NodeSummary, StartupScriptRenderer, TokenIssuer,
};
use crate::error::{BoxError, ClusterError};
use crate::reconciler::{Reconciler, Services};
use crate::scope::{AdminCredentials, ClusterIdentity, MachineScope};
use azure_services::{MockAzureServices, MockOperation};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use machine_api::{
    AzureMachineProviderSpec, CLUSTER_NAME_LABEL, Image, Machine, MachineSpec, ManagedDisk, OsDisk, ProviderSpec,
    ROLE_LABEL,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_NAMESPACE: &str = "default";
pub const TEST_CLUSTER: &str = "demo";
pub const TEST_SSH_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2E test@demo";
pub const TEST_KUBECONFIG: &str = "apiVersion: v1\nkind: Config\nclusters: []\n";

pub fn test_provider_spec() -> AzureMachineProviderSpec {
    AzureMachineProviderSpec {
        location: "westus2".to_string(),
        vm_size: "Standard_B2ms".to_string(),
        image: Image {
            publisher: "Canonical".to_string(),
            offer: "UbuntuServer".to_string(),
            sku: "18.04-LTS".to_string(),
            version: "latest".to_string(),
        },
        os_disk: OsDisk {
            os_type: "Linux".to_string(),
            managed_disk: ManagedDisk {
                storage_account_type: "Premium_LRS".to_string(),
            },
            disk_size_gb: 30,
        },
        ssh_public_key: STANDARD.encode(TEST_SSH_KEY),
    }
}

/// Machine with the `set` role label and the cluster-name label
pub fn test_machine(name: &str, role_label: &str, cluster: &str) -> Machine {
    let mut machine = Machine::new(
        name,
        MachineSpec {
            provider_spec: ProviderSpec {
                value: Some(test_provider_spec()),
            },
            provider_id: None,
        },
    );
    machine.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    machine.metadata.labels = Some(BTreeMap::from([
        (ROLE_LABEL.to_string(), role_label.to_string()),
        (CLUSTER_NAME_LABEL.to_string(), cluster.to_string()),
    ]));
    machine
}

pub fn test_credentials() -> AdminCredentials {
    AdminCredentials::new(TEST_KUBECONFIG)
}

/// Scope for a machine in cluster `demo`
pub fn test_scope(name: &str, role_label: &str, with_credentials: bool) -> MachineScope {
    MachineScope::new(
        test_machine(name, role_label, TEST_CLUSTER),
        ClusterIdentity::new(TEST_CLUSTER, TEST_NAMESPACE),
        with_credentials.then(test_credentials),
    )
    .unwrap()
}

pub fn machine_summary(name: &str, role_label: &str) -> MachineSummary {
    MachineSummary {
        name: name.to_string(),
        role_label: Some(role_label.to_string()),
        cluster_name: Some(TEST_CLUSTER.to_string()),
    }
}

pub fn node(name: &str, provider_id: &str) -> NodeSummary {
    NodeSummary {
        kind: "Node".to_string(),
        api_version: "v1".to_string(),
        name: name.to_string(),
        provider_id: provider_id.to_string(),
    }
}

/// Token issuer that records each request's TTL.
///
/// When built with [`observing`](Self::observing) it also snapshots how
/// many Azure calls had been made at the moment each token was issued.
#[derive(Default)]
pub struct FakeTokenIssuer {
    ttls: Mutex<Vec<Duration>>,
    azure_calls_at_issue: Mutex<Vec<usize>>,
    azure: Option<MockAzureServices>,
    failure: Mutex<Option<String>>,
}

impl FakeTokenIssuer {
    pub fn observing(azure: MockAzureServices) -> Self {
        Self {
            azure: Some(azure),
            ..Default::default()
        }
    }

    pub fn fail(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn ttls(&self) -> Vec<Duration> {
        self.ttls.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.ttls.lock().unwrap().len()
    }

    pub fn azure_calls_at_issue(&self) -> Vec<usize> {
        self.azure_calls_at_issue.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TokenIssuer for FakeTokenIssuer {
    async fn issue_bootstrap_token(
        &self,
        _credentials: &AdminCredentials,
        ttl: Duration,
    ) -> Result<String, ClusterError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(ClusterError::Unavailable(message));
        }
        self.ttls.lock().unwrap().push(ttl);
        if let Some(azure) = &self.azure {
            self.azure_calls_at_issue.lock().unwrap().push(azure.calls().len());
        }
        Ok("abcdef.0123456789abcdef".to_string())
    }
}

/// Node inventory serving fixed pages chained by `page-N` continue tokens
#[derive(Default)]
pub struct FakeNodeInventory {
    pages: Mutex<Vec<Vec<NodeSummary>>>,
    visited: Mutex<Vec<Option<String>>>,
}

impl FakeNodeInventory {
    pub fn set_pages(&self, pages: Vec<Vec<NodeSummary>>) {
        *self.pages.lock().unwrap() = pages;
    }

    /// Continue tokens received, in order (`None` for the first page)
    pub fn visited(&self) -> Vec<Option<String>> {
        self.visited.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl NodeInventory for FakeNodeInventory {
    async fn list_nodes(
        &self,
        _credentials: &AdminCredentials,
        continue_token: Option<&str>,
    ) -> Result<NodePage, ClusterError> {
        self.visited.lock().unwrap().push(continue_token.map(str::to_string));
        let index = match continue_token {
            None => 0,
            Some(token) => token
                .strip_prefix("page-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| ClusterError::InvalidRequest(format!("bad continue token {token}")))?,
        };
        let pages = self.pages.lock().unwrap();
        let nodes = pages.get(index).cloned().unwrap_or_default();
        let continue_token = (index + 1 < pages.len()).then(|| format!("page-{}", index + 1));
        Ok(NodePage { nodes, continue_token })
    }
}

#[derive(Default)]
pub struct FakeMachineRegistry {
    machines: Mutex<Vec<MachineSummary>>,
    calls: AtomicUsize,
}

impl FakeMachineRegistry {
    pub fn add(&self, machine: MachineSummary) {
        self.machines.lock().unwrap().push(machine);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MachineRegistry for FakeMachineRegistry {
    async fn list_machines(&self, _namespace: &str) -> Result<Vec<MachineSummary>, ClusterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.machines.lock().unwrap().clone())
    }
}

/// Renders `#!/bin/bash` plus the machine name and token, recording tokens.
#[derive(Default)]
pub struct FakeScriptRenderer {
    tokens: Mutex<Vec<Option<String>>>,
}

impl FakeScriptRenderer {
    pub fn tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().unwrap().clone()
    }
}

impl StartupScriptRenderer for FakeScriptRenderer {
    fn render(&self, scope: &MachineScope, bootstrap_token: Option<&str>) -> Result<String, BoxError> {
        self.tokens.lock().unwrap().push(bootstrap_token.map(str::to_string));
        Ok(format!(
            "#!/bin/bash\n# {}\n{}\n",
            scope.name(),
            bootstrap_token.unwrap_or("init")
        ))
    }
}

/// Reconciler wired to in-memory collaborators
pub struct TestHarness {
    pub azure: MockAzureServices,
    pub tokens: Arc<FakeTokenIssuer>,
    pub nodes: Arc<FakeNodeInventory>,
    pub machines: Arc<FakeMachineRegistry>,
    pub scripts: Arc<FakeScriptRenderer>,
}

impl TestHarness {
    pub fn new() -> Self {
        let azure = MockAzureServices::new();
        Self {
            tokens: Arc::new(FakeTokenIssuer::observing(azure.clone())),
            azure,
            nodes: Arc::new(FakeNodeInventory::default()),
            machines: Arc::new(FakeMachineRegistry::default()),
            scripts: Arc::new(FakeScriptRenderer::default()),
        }
    }

    pub fn reconciler(&self) -> Reconciler {
        Reconciler::new(Services {
            virtual_machines: Arc::new(self.azure.clone()),
            network_interfaces: Arc::new(self.azure.clone()),
            extensions: Arc::new(self.azure.clone()),
            tokens: self.tokens.clone(),
            nodes: self.nodes.clone(),
            machines: self.machines.clone(),
            scripts: self.scripts.clone(),
        })
    }

    /// Fully provisioned peer: VM in `Succeeded` plus its startup extension
    pub fn add_provisioned_vm(&self, name: &str) {
        self.azure.add_vm(name, "Standard_B2ms", machine_api::VmState::Succeeded);
        self.azure.add_extension(name, azure_services::naming::STARTUP_EXTENSION_NAME);
    }

    /// Total calls across every collaborator
    pub fn total_calls(&self) -> usize {
        self.azure.calls().len() + self.tokens.count() + self.nodes.visited().len() + self.machines.calls()
    }

    pub fn azure_operations(&self) -> Vec<MockOperation> {
        self.azure.operations()
    }
}
