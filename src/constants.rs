// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Kubernetes annotation keys used by config-sync
pub mod annotations {
    /// Prefix shared by every annotation the operator reads or writes
    pub const BASE: &str = "k8s.config.sync";
    /// On a ConfigMap/Secret: "true" or "1" opts the resource in.
    /// On a Namespace, suffixed with `/<Kind>`: opts in every resource of that kind.
    pub const MANAGE: &str = "k8s.config.sync.manage";
    /// Prefix of the tracking annotation stamped on pod templates
    pub const HASH: &str = "k8s.config.sync.hash";
}

/// The operator name used as field manager for patches
pub const OPERATOR_NAME: &str = "config-sync";

/// Page size used when listing workloads
pub const LIST_PAGE_SIZE: u32 = 500;

/// Redelivery of events whose reconciliation failed on the API boundary
pub mod retry {
    /// Initial delay in seconds before retrying a failed event
    pub const INITIAL_INTERVAL_SECS: u64 = 5;
    /// Maximum delay in seconds (exponential backoff cap)
    pub const MAX_INTERVAL_SECS: u64 = 60;
    /// Attempts per event before it is dropped
    pub const MAX_ATTEMPTS: u32 = 5;
}

/// Metrics server defaults
pub mod metrics {
    pub const DEFAULT_PORT: u16 = 9090;
}
