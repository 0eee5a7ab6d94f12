// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Structural dependency check between a pod spec and a configuration resource.
//!
//! Only direct references count: single-key env var sources
//! (`secretKeyRef`/`configMapKeyRef`) and `secret`/`configMap` volumes.
//! Bulk `envFrom` imports and init containers are not inspected.

use crate::types::ConfigKind;
use k8s_openapi::api::core::v1::PodSpec;

/// Whether `spec` references the `kind` resource called `name`
pub fn depends_on(spec: &PodSpec, kind: ConfigKind, name: &str) -> bool {
    let env_match = spec
        .containers
        .iter()
        .flat_map(|c| c.env.iter().flatten())
        .any(|var| kind.env_reference(var) == Some(name));

    env_match
        || spec
            .volumes
            .iter()
            .flatten()
            .any(|volume| kind.volume_reference(volume) == Some(name))
}
