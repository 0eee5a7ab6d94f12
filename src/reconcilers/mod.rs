// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watch loops delivering ConfigMap and Secret changes to the rollout engine.

pub mod config;

pub use config::ConfigReconciler;
