//! Machine watcher.
//!
//! Drives reconciliation passes from a `kube_runtime::Controller` over
//! `Api<Machine>`. Each pass builds a fresh scope, runs the lifecycle
//! operation the machine needs and persists whatever the reconciler wrote
//! into the scope. The runtime never runs two passes for the same object
//! concurrently, which is what the scope's exclusive ownership relies on.

use crate::backoff::BackoffTracker;
use crate::config::ActuatorConfig;
use crate::error::ActuatorError;
use crate::reconciler::Reconciler;
use crate::scope::{AdminCredentials, ClusterIdentity, MachineScope};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::api::{Patch, PatchParams};
use kube::{Api, ResourceExt};
use kube_runtime::controller::{Action, Config as ControllerConfig};
use kube_runtime::{Controller, watcher};
use machine_api::{MACHINE_FINALIZER, Machine, PROVIDER_ANNOTATION};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Key holding the admin kubeconfig in the `<cluster>-kubeconfig` Secret
pub const KUBECONFIG_SECRET_KEY: &str = "value";

/// Which lifecycle operation a pass ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Created,
    Updated,
    Deleted,
}

/// Shared state for every reconciliation pass
pub struct Context {
    pub reconciler: Reconciler,
    pub machines: Api<Machine>,
    pub secrets: Api<Secret>,
    pub config: ActuatorConfig,
    pub backoff: BackoffTracker,
}

impl Context {
    pub fn new(reconciler: Reconciler, machines: Api<Machine>, secrets: Api<Secret>, config: ActuatorConfig) -> Self {
        let backoff = BackoffTracker::new(config.backoff_min_minutes, config.backoff_max_minutes);
        Self {
            reconciler,
            machines,
            secrets,
            config,
            backoff,
        }
    }
}

/// Runs Update when the machine exists and is ready, Create otherwise.
pub async fn run_pass(reconciler: &Reconciler, scope: &mut MachineScope) -> Result<PassOutcome, ActuatorError> {
    if reconciler.exists(scope).await? {
        reconciler.update(scope).await?;
        Ok(PassOutcome::Updated)
    } else {
        reconciler.create(scope).await?;
        Ok(PassOutcome::Created)
    }
}

/// Reads the admin kubeconfig of `cluster` from `<cluster>-kubeconfig`.
///
/// A missing Secret or key yields `None`; only operations that need the
/// workload cluster fail on that.
pub async fn load_credentials(secrets: &Api<Secret>, cluster: &str) -> Result<Option<AdminCredentials>, ActuatorError> {
    let name = format!("{cluster}-kubeconfig");
    let Some(secret) = secrets.get_opt(&name).await? else {
        debug!("No kubeconfig secret {} for cluster {}", name, cluster);
        return Ok(None);
    };
    Ok(credentials_from_secret(&secret))
}

fn credentials_from_secret(secret: &Secret) -> Option<AdminCredentials> {
    let bytes = secret.data.as_ref()?.get(KUBECONFIG_SECRET_KEY)?;
    let kubeconfig = String::from_utf8(bytes.0.clone()).ok()?;
    Some(AdminCredentials::new(kubeconfig))
}

/// Merge patch for the metadata and spec fields the reconciler may set.
pub fn metadata_patch(original: &Machine, updated: &Machine) -> Option<Value> {
    let mut patch = serde_json::Map::new();

    let annotation = |m: &Machine| m.annotations().get(PROVIDER_ANNOTATION).cloned();
    if let Some(value) = annotation(updated).filter(|v| annotation(original).as_ref() != Some(v)) {
        patch.insert(
            "metadata".to_string(),
            json!({ "annotations": { PROVIDER_ANNOTATION: value } }),
        );
    }
    if updated.spec.provider_id.is_some() && updated.spec.provider_id != original.spec.provider_id {
        patch.insert("spec".to_string(), json!({ "providerID": updated.spec.provider_id }));
    }

    (!patch.is_empty()).then(|| Value::Object(patch))
}

/// Status merge patch for nodeRef, providerStatus and errorMessage.
pub fn status_patch(original: &Machine, updated: &Machine, error_message: Option<&str>) -> Option<Value> {
    let before = original.status.clone().unwrap_or_default();
    let after = updated.status.clone().unwrap_or_default();
    let mut status = serde_json::Map::new();

    if after.node_ref.is_some() && after.node_ref != before.node_ref {
        status.insert("nodeRef".to_string(), json!(after.node_ref));
    }
    if after.provider_status.is_some() && after.provider_status != before.provider_status {
        status.insert("providerStatus".to_string(), json!(after.provider_status));
    }
    if before.error_message.as_deref() != error_message {
        status.insert("errorMessage".to_string(), json!(error_message));
    }

    (!status.is_empty()).then(|| json!({ "status": status }))
}

fn finalizers_patch(finalizers: Vec<String>) -> Value {
    json!({ "metadata": { "finalizers": finalizers } })
}

async fn reconcile_machine(machine: Arc<Machine>, ctx: Arc<Context>) -> Result<Action, ActuatorError> {
    let name = machine.name_any();
    let key = format!("{}/{}", machine.namespace().unwrap_or_default(), name);

    match reconcile_inner(&machine, &ctx).await {
        Ok(outcome) => {
            ctx.backoff.reset(&key);
            debug!("Machine {} reconciled: {:?}", key, outcome);
            Ok(match outcome {
                PassOutcome::Deleted => Action::await_change(),
                _ => Action::requeue(ctx.config.requeue_interval),
            })
        }
        Err(e) => {
            if let Some(patch) = status_patch(&machine, &machine, Some(&e.to_string())) {
                if let Err(patch_err) = ctx
                    .machines
                    .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
                    .await
                {
                    warn!("Failed to record error on machine {}: {}", key, patch_err);
                }
            }
            Err(e)
        }
    }
}

async fn reconcile_inner(machine: &Machine, ctx: &Context) -> Result<PassOutcome, ActuatorError> {
    let name = machine.name_any();
    let namespace = machine.namespace().unwrap_or_else(|| ctx.config.namespace.clone());
    let cluster = machine
        .cluster_name()
        .map(str::to_string)
        .or_else(|| ctx.config.cluster_name.clone())
        .ok_or_else(|| ActuatorError::Configuration(format!("machine {name} has no cluster name")))?;

    let credentials = load_credentials(&ctx.secrets, &cluster).await?;
    let mut scope = MachineScope::new(machine.clone(), ClusterIdentity::new(cluster, namespace), credentials)?;
    let finalizers = machine.finalizers().to_vec();

    if machine.metadata.deletion_timestamp.is_some() {
        if finalizers.iter().any(|f| f == MACHINE_FINALIZER) {
            ctx.reconciler.delete(&mut scope).await?;
            let remaining = finalizers.into_iter().filter(|f| f != MACHINE_FINALIZER).collect();
            ctx.machines
                .patch(&name, &PatchParams::default(), &Patch::Merge(&finalizers_patch(remaining)))
                .await?;
            info!("Released machine {}", name);
        }
        return Ok(PassOutcome::Deleted);
    }

    if !finalizers.iter().any(|f| f == MACHINE_FINALIZER) {
        let mut with_finalizer = finalizers;
        with_finalizer.push(MACHINE_FINALIZER.to_string());
        ctx.machines
            .patch(&name, &PatchParams::default(), &Patch::Merge(&finalizers_patch(with_finalizer)))
            .await?;
    }

    let result = run_pass(&ctx.reconciler, &mut scope).await;

    // Side effects recorded before a failure are still real.
    let updated = scope.to_machine();
    if let Some(patch) = metadata_patch(machine, &updated) {
        ctx.machines
            .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
            .await?;
    }
    if result.is_ok() {
        if let Some(patch) = status_patch(machine, &updated, None) {
            ctx.machines
                .patch_status(&name, &PatchParams::default(), &Patch::Merge(&patch))
                .await?;
        }
    }
    result
}

fn error_policy(machine: Arc<Machine>, error: &ActuatorError, ctx: Arc<Context>) -> Action {
    let key = format!("{}/{}", machine.namespace().unwrap_or_default(), machine.name_any());
    if error.is_terminal() {
        error!("Machine {} needs operator intervention: {}", key, error);
        return Action::await_change();
    }
    let delay = ctx.backoff.record_failure(&key);
    error!(
        "Reconciliation error for machine {} (attempt {}), retrying in {}s: {}",
        key,
        ctx.backoff.error_count(&key),
        delay.as_secs(),
        error
    );
    Action::requeue(delay)
}

/// Watches Machines and reconciles them until the stream ends.
pub async fn watch_machines(ctx: Arc<Context>) -> Result<(), ActuatorError> {
    info!("Starting Machine watcher in namespace {}", ctx.config.namespace);

    let controller_config = ControllerConfig::default()
        .debounce(Duration::from_secs(5))
        .concurrency(3);

    Controller::new(ctx.machines.clone(), watcher::Config::default())
        .with_config(controller_config)
        .run(reconcile_machine, error_policy, ctx)
        .for_each(|res| async move {
            if let Err(e) = res {
                error!("Machine controller error: {}", e);
            }
        })
        .await;

    Err(ActuatorError::Watch("Machine watch stream ended".to_string()))
}
