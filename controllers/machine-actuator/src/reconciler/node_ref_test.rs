//! Unit tests for node-identity resolution

#[cfg(test)]
mod tests {
    use crate::error::ActuatorError;
    use crate::test_utils::*;
    use machine_api::VmState;

    fn scope_with_vm(vm_id: &str, with_credentials: bool) -> crate::scope::MachineScope {
        let mut scope = test_scope("worker-1", "node", with_credentials);
        scope.record_vm(vm_id.to_string(), VmState::Succeeded);
        scope
    }

    #[tokio::test]
    async fn test_match_on_last_page_visits_every_page() {
        let harness = TestHarness::new();
        harness.nodes.set_pages(vec![
            vec![node("a", "azure:///vm-a")],
            vec![node("b", "azure:///vm-b")],
            vec![node("c", "azure:///vm-c"), node("worker-1", "azure:///vm-42")],
        ]);
        let scope = scope_with_vm("vm-42", true);

        let node_ref = harness.reconciler().resolve_node_ref(&scope).await.unwrap();

        assert_eq!(node_ref.name, "worker-1");
        assert_eq!(node_ref.api_version, "v1");
        assert_eq!(
            harness.nodes.visited(),
            vec![None, Some("page-1".to_string()), Some("page-2".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stops_at_first_match() {
        let harness = TestHarness::new();
        harness.nodes.set_pages(vec![
            vec![node("worker-1", "azure:///vm-42")],
            vec![node("decoy", "azure:///vm-42")],
        ]);
        let scope = scope_with_vm("vm-42", true);

        let node_ref = harness.reconciler().resolve_node_ref(&scope).await.unwrap();

        assert_eq!(node_ref.name, "worker-1");
        assert_eq!(harness.nodes.visited().len(), 1);
    }

    #[tokio::test]
    async fn test_no_match_is_resolution_failure() {
        let harness = TestHarness::new();
        harness.nodes.set_pages(vec![
            vec![node("a", "azure:///vm-a")],
            vec![node("b", "")],
        ]);
        let scope = scope_with_vm("vm-42", true);

        let err = harness.reconciler().resolve_node_ref(&scope).await.unwrap_err();

        assert!(matches!(err, ActuatorError::ResolutionFailure(_)));
        assert_eq!(harness.nodes.visited().len(), 2);
    }

    #[tokio::test]
    async fn test_empty_inventory_is_resolution_failure() {
        let harness = TestHarness::new();
        let scope = scope_with_vm("vm-42", true);

        let err = harness.reconciler().resolve_node_ref(&scope).await.unwrap_err();
        assert!(matches!(err, ActuatorError::ResolutionFailure(_)));
    }

    #[tokio::test]
    async fn test_missing_vm_id_is_precondition_error() {
        let harness = TestHarness::new();
        let scope = test_scope("worker-1", "node", true);

        let err = harness.reconciler().resolve_node_ref(&scope).await.unwrap_err();

        assert!(matches!(err, ActuatorError::Configuration(_)));
        assert!(harness.nodes.visited().is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_is_precondition_error() {
        let harness = TestHarness::new();
        let scope = scope_with_vm("vm-42", false);

        let err = harness.reconciler().resolve_node_ref(&scope).await.unwrap_err();

        assert!(matches!(err, ActuatorError::Configuration(_)));
        assert!(harness.nodes.visited().is_empty());
    }
}
