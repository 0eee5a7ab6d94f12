// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Opt-in policy: decides whether a changed resource is handled at all.

use crate::constants::annotations;
use crate::kubernetes::ClusterApi;
use crate::types::{ConfigKind, ConfigResource};
use std::collections::BTreeMap;
use tracing::debug;

/// Resource-level opt-in (`k8s.config.sync.manage`), case-insensitive
pub fn resource_opted_in(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(annotations::MANAGE)
        .is_some_and(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

/// Namespace-level opt-in for one kind (`k8s.config.sync.manage/<Kind>`)
pub fn namespace_opted_in(annotations: &BTreeMap<String, String>, kind: ConfigKind) -> bool {
    annotations
        .get(&format!("{}/{}", annotations::MANAGE, kind.as_str()))
        .is_some_and(|v| v == "true" || v == "1")
}

/// Whether `resource` should trigger any rollouts.
///
/// The resource's own annotation wins; otherwise the namespace decides. A
/// namespace that cannot be read counts as not opted in.
pub async fn should_handle<C: ClusterApi + ?Sized>(cluster: &C, resource: &ConfigResource) -> bool {
    if resource_opted_in(&resource.annotations) {
        return true;
    }

    match cluster.namespace_annotations(&resource.namespace).await {
        Ok(Some(ns_annotations)) => namespace_opted_in(&ns_annotations, resource.kind),
        Ok(None) => {
            debug!("Namespace {} not found", resource.namespace);
            false
        }
        Err(e) => {
            debug!("Failed to look up namespace {}: {}", resource.namespace, e);
            false
        }
    }
}
