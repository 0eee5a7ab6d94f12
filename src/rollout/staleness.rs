// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::types::WorkloadCandidate;

/// Whether the workload's pod template was last rolled for a different fingerprint
pub fn needs_update(workload: &WorkloadCandidate, tracking_key: &str, fingerprint: &str) -> bool {
    workload
        .template_annotations
        .get(tracking_key)
        .map(String::as_str)
        != Some(fingerprint)
}
