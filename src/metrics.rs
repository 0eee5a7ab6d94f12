// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics for config changes and workload rollouts.
//!
//! A [`Metrics`] instance owns its own [`Registry`]; it is created once at
//! startup and shared with the watchers, the rollout manager and the HTTP
//! server. Recording never fails the caller: label errors are logged and
//! otherwise ignored.

use crate::error::Result;
use prometheus::{
    Encoder, HistogramOpts, HistogramTimer, HistogramVec, IntCounterVec, Opts, Registry,
    TextEncoder,
};
use tracing::debug;

pub struct Metrics {
    registry: Registry,
    config_changes: IntCounterVec,
    workload_patches: IntCounterVec,
    processing_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let config_changes = IntCounterVec::new(
            Opts::new("config_change_total", "Number of configuration changes"),
            &["namespace", "resource", "name"],
        )?;
        registry.register(Box::new(config_changes.clone()))?;

        let workload_patches = IntCounterVec::new(
            Opts::new("resource_patch_total", "Patches by resource"),
            &["namespace", "resource", "name"],
        )?;
        registry.register(Box::new(workload_patches.clone()))?;

        let processing_seconds = HistogramVec::new(
            HistogramOpts::new(
                "event_processing_seconds",
                "Time spent processing events",
            )
            .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
            &["resource"],
        )?;
        registry.register(Box::new(processing_seconds.clone()))?;

        Ok(Self {
            registry,
            config_changes,
            workload_patches,
            processing_seconds,
        })
    }

    /// A ConfigMap or Secret change was observed
    pub fn config_changed(&self, namespace: &str, kind: &str, name: &str) {
        match self
            .config_changes
            .get_metric_with_label_values(&[namespace, kind, name])
        {
            Ok(counter) => counter.inc(),
            Err(e) => debug!("Failed to record config change: {}", e),
        }
    }

    /// A workload was patched to roll it
    pub fn workload_patched(&self, namespace: &str, kind: &str, name: &str) {
        match self
            .workload_patches
            .get_metric_with_label_values(&[namespace, kind, name])
        {
            Ok(counter) => counter.inc(),
            Err(e) => debug!("Failed to record workload patch: {}", e),
        }
    }

    /// Start timing the processing of one event; observed when dropped
    pub fn start_timer(&self, kind: &str) -> Option<HistogramTimer> {
        match self.processing_seconds.get_metric_with_label_values(&[kind]) {
            Ok(histogram) => Some(histogram.start_timer()),
            Err(e) => {
                debug!("Failed to start processing timer: {}", e);
                None
            }
        }
    }

    /// Encode all metrics in Prometheus text format
    pub fn gather(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {}", e)).into())
    }

    #[cfg(test)]
    pub fn config_change_count(&self, namespace: &str, kind: &str, name: &str) -> u64 {
        self.config_changes
            .with_label_values(&[namespace, kind, name])
            .get()
    }

    #[cfg(test)]
    pub fn workload_patch_count(&self, namespace: &str, kind: &str, name: &str) -> u64 {
        self.workload_patches
            .with_label_values(&[namespace, kind, name])
            .get()
    }

    #[cfg(test)]
    pub fn processing_sample_count(&self, kind: &str) -> u64 {
        self.processing_seconds
            .with_label_values(&[kind])
            .get_sample_count()
    }
}
