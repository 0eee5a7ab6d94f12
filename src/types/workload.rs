// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workloads that can be rolled, and the patches that roll them.

use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{PodSpec, PodTemplateSpec};
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    StatefulSet,
}

impl WorkloadKind {
    /// Order in which workload kinds are processed
    pub const ALL: [WorkloadKind; 3] = [
        WorkloadKind::Deployment,
        WorkloadKind::DaemonSet,
        WorkloadKind::StatefulSet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadKind::Deployment => "Deployment",
            WorkloadKind::DaemonSet => "DaemonSet",
            WorkloadKind::StatefulSet => "StatefulSet",
        }
    }
}

impl fmt::Display for WorkloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An apps/v1 type that owns a pod template
pub trait PodTemplated:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + DeserializeOwned
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    const WORKLOAD_KIND: WorkloadKind;

    fn pod_template(&self) -> Option<&PodTemplateSpec>;
}

impl PodTemplated for Deployment {
    const WORKLOAD_KIND: WorkloadKind = WorkloadKind::Deployment;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

impl PodTemplated for DaemonSet {
    const WORKLOAD_KIND: WorkloadKind = WorkloadKind::DaemonSet;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

impl PodTemplated for StatefulSet {
    const WORKLOAD_KIND: WorkloadKind = WorkloadKind::StatefulSet;

    fn pod_template(&self) -> Option<&PodTemplateSpec> {
        self.spec.as_ref().map(|s| &s.template)
    }
}

/// A workload under examination for a single reconciliation pass
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadCandidate {
    pub kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    /// `None` when the object carries no pod spec
    pub pod_spec: Option<PodSpec>,
    /// Annotations of the pod template metadata
    pub template_annotations: BTreeMap<String, String>,
}

impl WorkloadCandidate {
    pub fn from_object<W: PodTemplated>(obj: &W) -> Self {
        let template = obj.pod_template();

        Self {
            kind: W::WORKLOAD_KIND,
            namespace: obj.namespace().unwrap_or_default(),
            name: obj.name_any(),
            pod_spec: template.and_then(|t| t.spec.clone()),
            template_annotations: template
                .and_then(|t| t.metadata.as_ref())
                .and_then(|m| m.annotations.clone())
                .unwrap_or_default(),
        }
    }
}

/// Merge a single annotation into the pod template metadata of a workload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOperation {
    pub workload_kind: WorkloadKind,
    pub namespace: String,
    pub name: String,
    pub annotation_key: String,
    pub annotation_value: String,
}

impl PatchOperation {
    /// JSON merge-patch document touching nothing but the tracking annotation
    pub fn merge_patch(&self) -> Value {
        json!({
            "spec": {
                "template": {
                    "metadata": {
                        "annotations": {
                            &self.annotation_key: &self.annotation_value,
                        }
                    }
                }
            }
        })
    }
}

impl fmt::Display for PatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}/{}: {}={}",
            self.workload_kind, self.namespace, self.name, self.annotation_key, self.annotation_value
        )
    }
}
