// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload enumeration and patching

use crate::constants::{LIST_PAGE_SIZE, OPERATOR_NAME};
use crate::error::Result;
use crate::types::{PatchOperation, PodTemplated, WorkloadCandidate, WorkloadKind};
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use kube::{
    api::{ListParams, Patch, PatchParams},
    Api, Client,
};
use tracing::{debug, instrument};

/// List all workloads of `kind` in `namespace`
#[instrument(skip(client))]
pub async fn list_workloads(
    client: &Client,
    kind: WorkloadKind,
    namespace: &str,
) -> Result<Vec<WorkloadCandidate>> {
    debug!("Retrieving {} resources", kind);

    match kind {
        WorkloadKind::Deployment => list_namespaced::<Deployment>(client, namespace).await,
        WorkloadKind::DaemonSet => list_namespaced::<DaemonSet>(client, namespace).await,
        WorkloadKind::StatefulSet => list_namespaced::<StatefulSet>(client, namespace).await,
    }
}

async fn list_namespaced<W: PodTemplated>(
    client: &Client,
    namespace: &str,
) -> Result<Vec<WorkloadCandidate>> {
    let api: Api<W> = Api::namespaced(client.clone(), namespace);
    let mut params = ListParams::default().limit(LIST_PAGE_SIZE);
    let mut candidates = Vec::new();

    loop {
        let page = api.list(&params).await?;
        candidates.extend(page.items.iter().map(WorkloadCandidate::from_object::<W>));

        match page.metadata.continue_ {
            Some(token) if !token.is_empty() => params = params.continue_token(&token),
            _ => break,
        }
    }

    Ok(candidates)
}

/// Merge the patch's annotation into the workload's pod template
#[instrument(skip(client, patch), fields(workload = %format!("{}/{}", patch.namespace, patch.name)))]
pub async fn patch_workload(client: &Client, patch: &PatchOperation) -> Result<()> {
    match patch.workload_kind {
        WorkloadKind::Deployment => patch_namespaced::<Deployment>(client, patch).await,
        WorkloadKind::DaemonSet => patch_namespaced::<DaemonSet>(client, patch).await,
        WorkloadKind::StatefulSet => patch_namespaced::<StatefulSet>(client, patch).await,
    }
}

async fn patch_namespaced<W: PodTemplated>(client: &Client, patch: &PatchOperation) -> Result<()> {
    let api: Api<W> = Api::namespaced(client.clone(), &patch.namespace);
    let params = PatchParams {
        field_manager: Some(OPERATOR_NAME.to_string()),
        ..Default::default()
    };

    api.patch(&patch.name, &params, &Patch::Merge(patch.merge_patch()))
        .await?;

    Ok(())
}
