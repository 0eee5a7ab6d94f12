// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Domain types shared by the rollout engine and the Kubernetes boundary.

pub mod resource;
pub mod workload;

pub use resource::{ConfigKind, ConfigResource, ConfigSource};
pub use workload::{PatchOperation, PodTemplated, WorkloadCandidate, WorkloadKind};
