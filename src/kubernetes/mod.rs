// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes API boundary: namespace lookup, workload enumeration and patching.

pub mod client;
pub mod namespaces;
pub mod workloads;

use crate::error::Result;
use crate::types::{PatchOperation, WorkloadCandidate, WorkloadKind};
use async_trait::async_trait;
use std::collections::BTreeMap;

pub use client::KubeCluster;

/// Operations the rollout engine needs from the cluster
#[async_trait]
pub trait ClusterApi: Send + Sync {
    /// Annotations of the namespace, `None` if it does not exist
    async fn namespace_annotations(&self, namespace: &str)
        -> Result<Option<BTreeMap<String, String>>>;

    /// All workloads of `kind` in `namespace`
    async fn list_workloads(
        &self,
        kind: WorkloadKind,
        namespace: &str,
    ) -> Result<Vec<WorkloadCandidate>>;

    /// Apply a single patch operation to the live object
    async fn patch_workload(&self, patch: &PatchOperation) -> Result<()>;
}
