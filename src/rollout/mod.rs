// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation engine: fingerprinting, opt-in policy, dependency matching
//! and staleness filtering, composed by the [`RolloutManager`].

pub mod fingerprint;
pub mod manager;
pub mod matcher;
pub mod policy;
pub mod staleness;

pub use fingerprint::fingerprint;
pub use manager::{RolloutManager, RolloutMode, RolloutOutcome};
pub use matcher::depends_on;
pub use policy::should_handle;
pub use staleness::needs_update;
