// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! [`ClusterApi`] backed by a live Kubernetes client

use crate::error::Result;
use crate::kubernetes::{namespaces, workloads, ClusterApi};
use crate::types::{PatchOperation, WorkloadCandidate, WorkloadKind};
use async_trait::async_trait;
use kube::Client;
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ClusterApi for KubeCluster {
    async fn namespace_annotations(
        &self,
        namespace: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        namespaces::get_namespace_annotations(&self.client, namespace).await
    }

    async fn list_workloads(
        &self,
        kind: WorkloadKind,
        namespace: &str,
    ) -> Result<Vec<WorkloadCandidate>> {
        workloads::list_workloads(&self.client, kind, namespace).await
    }

    async fn patch_workload(&self, patch: &PatchOperation) -> Result<()> {
        workloads::patch_workload(&self.client, patch).await
    }
}
