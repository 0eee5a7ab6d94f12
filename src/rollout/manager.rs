// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Central coordinator turning a config change into workload patches.

use crate::error::Result;
use crate::kubernetes::ClusterApi;
use crate::metrics::Metrics;
use crate::rollout::{depends_on, needs_update, should_handle};
use crate::types::{ConfigResource, PatchOperation, WorkloadCandidate, WorkloadKind};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of one reconciliation pass
#[derive(Debug, Default)]
pub struct RolloutOutcome {
    /// Patches the API server accepted
    pub applied: Vec<PatchOperation>,
    /// Patches that were rejected, with the reason
    pub failed: Vec<(PatchOperation, String)>,
}

/// How eagerly dependent workloads are brought up to date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloutMode {
    /// A live change: every stale dependent is patched
    Change,
    /// Replay of a watch listing: only dependents already stamped with an
    /// older fingerprint are patched, so never-rolled workloads stay untouched
    CatchUp,
}

/// Rolls the workloads depending on a changed ConfigMap or Secret.
/// Holds no state between events; everything is read fresh from the cluster.
pub struct RolloutManager<C> {
    cluster: C,
    metrics: Arc<Metrics>,
}

impl<C: ClusterApi> RolloutManager<C> {
    pub fn new(cluster: C, metrics: Arc<Metrics>) -> Self {
        Self { cluster, metrics }
    }

    pub fn cluster(&self) -> &C {
        &self.cluster
    }

    /// Patches needed to bring every dependent workload up to date with `resource`.
    ///
    /// Empty when the resource is not opted in. Fails only when workloads
    /// cannot be enumerated.
    pub async fn plan(&self, resource: &ConfigResource) -> Result<Vec<PatchOperation>> {
        self.plan_with(resource, RolloutMode::Change).await
    }

    pub async fn plan_with(
        &self,
        resource: &ConfigResource,
        mode: RolloutMode,
    ) -> Result<Vec<PatchOperation>> {
        if !should_handle(&self.cluster, resource).await {
            debug!("{}/{} not annotated", resource.kind, resource.name);
            return Ok(Vec::new());
        }

        info!(
            "Handler ({:?}) for {} {} on {} -> {}",
            mode,
            resource.kind,
            resource.name,
            resource.namespace,
            resource.fingerprint()
        );

        let mut patches = Vec::new();
        for kind in WorkloadKind::ALL {
            let candidates = self.cluster.list_workloads(kind, &resource.namespace).await?;
            patches.extend(
                candidates
                    .iter()
                    .filter(|workload| self.requires_patch(workload, resource, mode))
                    .map(|workload| patch_for(workload, resource)),
            );
        }

        Ok(patches)
    }

    /// Plan and apply for a live change
    pub async fn reconcile(&self, resource: &ConfigResource) -> Result<RolloutOutcome> {
        self.apply(resource, RolloutMode::Change).await
    }

    /// Plan and apply for a resource seen in a watch listing, repairing
    /// workloads that missed a change while the watch was down
    pub async fn catch_up(&self, resource: &ConfigResource) -> Result<RolloutOutcome> {
        self.apply(resource, RolloutMode::CatchUp).await
    }

    /// Plan and apply. A rejected patch is recorded in the outcome and does not
    /// stop the remaining ones.
    #[instrument(skip(self, resource), fields(resource = %resource))]
    pub async fn apply(&self, resource: &ConfigResource, mode: RolloutMode) -> Result<RolloutOutcome> {
        let _timer = self.metrics.start_timer(resource.kind.as_str());

        let mut outcome = RolloutOutcome::default();
        for patch in self.plan_with(resource, mode).await? {
            info!("Updating {} {}", patch.workload_kind, patch.name);

            match self.cluster.patch_workload(&patch).await {
                Ok(()) => {
                    self.metrics.workload_patched(
                        &patch.namespace,
                        patch.workload_kind.as_str(),
                        &patch.name,
                    );
                    outcome.applied.push(patch);
                }
                Err(e) => {
                    warn!("Failed to apply {}: {}", patch, e);
                    outcome.failed.push((patch, e.to_string()));
                }
            }
        }

        Ok(outcome)
    }

    fn requires_patch(
        &self,
        workload: &WorkloadCandidate,
        resource: &ConfigResource,
        mode: RolloutMode,
    ) -> bool {
        let uses_resource = workload
            .pod_spec
            .as_ref()
            .is_some_and(|spec| depends_on(spec, resource.kind, &resource.name));

        if !uses_resource {
            debug!(
                "{} {} not used by {}/{}",
                workload.kind, workload.name, resource.kind, resource.name
            );
            return false;
        }

        if mode == RolloutMode::CatchUp
            && !workload.template_annotations.contains_key(resource.tracking_key())
        {
            debug!(
                "{} {} never rolled for {}/{}, skipping catch-up",
                workload.kind, workload.name, resource.kind, resource.name
            );
            return false;
        }

        if !needs_update(workload, resource.tracking_key(), resource.fingerprint()) {
            debug!(
                "{} {} is up-to-date: {} == {}",
                workload.kind,
                workload.name,
                resource.tracking_key(),
                resource.fingerprint()
            );
            return false;
        }

        true
    }
}

fn patch_for(workload: &WorkloadCandidate, resource: &ConfigResource) -> PatchOperation {
    PatchOperation {
        workload_kind: workload.kind,
        namespace: workload.namespace.clone(),
        name: workload.name.clone(),
        annotation_key: resource.tracking_key().to_string(),
        annotation_value: resource.fingerprint().to_string(),
    }
}
