//! Unit tests for the existence probe

#[cfg(test)]
mod tests {
    use crate::error::ActuatorError;
    use crate::test_utils::*;
    use azure_services::{MockAzureServices, MockOperation};
    use machine_api::VmState;

    #[tokio::test]
    async fn test_absent_vm_is_not_an_error() {
        let harness = TestHarness::new();
        let mut scope = test_scope("worker-1", "node", true);

        assert!(!harness.reconciler().exists(&mut scope).await.unwrap());
        assert_eq!(scope.vm_id(), None);
    }

    #[tokio::test]
    async fn test_vm_without_extension_does_not_exist() {
        let harness = TestHarness::new();
        harness.azure.add_vm("worker-1", "Standard_B2ms", VmState::Succeeded);
        let mut scope = test_scope("worker-1", "node", true);

        assert!(!harness.reconciler().exists(&mut scope).await.unwrap());
        assert_eq!(scope.vm_state(), None);
    }

    #[tokio::test]
    async fn test_not_ready_states_short_circuit() {
        for state in [VmState::Creating, VmState::Failed, VmState::Deleting, VmState::Unknown] {
            let harness = TestHarness::new();
            harness.add_provisioned_vm("worker-1");
            harness.azure.set_vm_state("worker-1", state);
            let mut scope = test_scope("worker-1", "node", true);

            assert!(!harness.reconciler().exists(&mut scope).await.unwrap(), "{state}");
            assert_eq!(scope.vm_state(), Some(state));
            assert_eq!(scope.provider_id(), None);
            assert!(harness.nodes.visited().is_empty());
        }
    }

    #[tokio::test]
    async fn test_ready_vm_backfills_provider_id_and_node_ref() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        let vm_id = MockAzureServices::vm_id("worker-1");
        harness.nodes.set_pages(vec![vec![
            node("worker-0", "azure:///subscriptions/mock/other"),
            node("worker-1", &format!("azure://{vm_id}")),
        ]]);
        let mut scope = test_scope("worker-1", "node", true);

        assert!(harness.reconciler().exists(&mut scope).await.unwrap());

        assert_eq!(scope.vm_id(), Some(vm_id.as_str()));
        assert_eq!(scope.provider_id(), Some(format!("azure:////{vm_id}").as_str()));
        let node_ref = scope.node_ref().unwrap();
        assert_eq!(node_ref.name, "worker-1");
        assert_eq!(node_ref.kind, "Node");
    }

    #[tokio::test]
    async fn test_updating_vm_is_ready() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("cp-1");
        harness.azure.set_vm_state("cp-1", VmState::Updating);
        let mut scope = test_scope("cp-1", "controlplane", true);

        assert!(harness.reconciler().exists(&mut scope).await.unwrap());
    }

    #[tokio::test]
    async fn test_unresolved_node_still_exists() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        harness.nodes.set_pages(vec![vec![node("other", "azure:///elsewhere")]]);
        let mut scope = test_scope("worker-1", "node", true);

        assert!(harness.reconciler().exists(&mut scope).await.unwrap());
        assert!(scope.node_ref().is_none());
        assert!(scope.provider_id().is_some());
    }

    #[tokio::test]
    async fn test_missing_credentials_do_not_fail_exists() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        let mut scope = test_scope("worker-1", "node", false);

        assert!(harness.reconciler().exists(&mut scope).await.unwrap());
        assert!(scope.node_ref().is_none());
    }

    #[tokio::test]
    async fn test_existing_provider_id_is_kept() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        let mut machine = test_machine("worker-1", "node", TEST_CLUSTER);
        machine.spec.provider_id = Some("azure:////preset".to_string());
        let mut scope = crate::scope::MachineScope::new(
            machine,
            crate::scope::ClusterIdentity::new(TEST_CLUSTER, TEST_NAMESPACE),
            Some(test_credentials()),
        )
        .unwrap();

        assert!(harness.reconciler().exists(&mut scope).await.unwrap());
        assert_eq!(scope.provider_id(), Some("azure:////preset"));
    }

    #[tokio::test]
    async fn test_resolved_node_ref_is_not_looked_up_again() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        harness.nodes.set_pages(vec![vec![node("worker-1", &MockAzureServices::vm_id("worker-1"))]]);
        let reconciler = harness.reconciler();
        let mut scope = test_scope("worker-1", "node", true);

        reconciler.exists(&mut scope).await.unwrap();
        reconciler.exists(&mut scope).await.unwrap();

        assert_eq!(harness.nodes.visited().len(), 1);
    }

    #[tokio::test]
    async fn test_provider_errors_propagate() {
        let harness = TestHarness::new();
        harness.add_provisioned_vm("worker-1");
        harness.azure.fail_operation(MockOperation::ExtensionGet, "throttled");
        let mut scope = test_scope("worker-1", "node", true);

        let err = harness.reconciler().exists(&mut scope).await.unwrap_err();
        assert!(matches!(err, ActuatorError::Provider { .. }));
    }
}
