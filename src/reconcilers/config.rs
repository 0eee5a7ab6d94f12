// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Config reconciler - watches ConfigMaps or Secrets and rolls their dependents.

use crate::constants::retry::{INITIAL_INTERVAL_SECS, MAX_ATTEMPTS, MAX_INTERVAL_SECS};
use crate::kubernetes::ClusterApi;
use crate::metrics::Metrics;
use crate::rollout::{RolloutManager, RolloutMode};
use crate::types::{ConfigResource, ConfigSource};
use futures::StreamExt;
use kube::{Api, Client, ResourceExt};
use kube_runtime::watcher::{watcher, Config as WatcherConfig, Event};
use kube_runtime::WatchStreamExt;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub struct ConfigReconciler<K, C> {
    client: Client,
    manager: Arc<RolloutManager<C>>,
    metrics: Arc<Metrics>,
    namespace: Option<String>,
    _kind: PhantomData<K>,
}

impl<K: ConfigSource, C: ClusterApi + 'static> ConfigReconciler<K, C> {
    pub fn new(
        client: Client,
        manager: Arc<RolloutManager<C>>,
        metrics: Arc<Metrics>,
        namespace: Option<String>,
    ) -> Self {
        Self {
            client,
            manager,
            metrics,
            namespace,
            _kind: PhantomData,
        }
    }

    /// Process watch events until the stream ends.
    ///
    /// Objects delivered by a (re)listing are reconciled in catch-up mode, so
    /// startup only repairs workloads that missed a change.
    pub async fn run(self) -> anyhow::Result<()> {
        let api: Api<K> = match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        };
        let kind = K::CONFIG_KIND;
        let mut in_flight = InFlight::new(self.manager.clone());

        info!("Watching {} resources", kind);

        let mut events = watcher(api, WatcherConfig::default())
            .default_backoff()
            .boxed();

        while let Some(event) = events.next().await {
            match event {
                // Creations arrive here too; they only stamp dependents
                Ok(Event::Apply(obj)) => {
                    if let Some(resource) = read_resource(&obj) {
                        self.metrics.config_changed(
                            &resource.namespace,
                            resource.kind.as_str(),
                            &resource.name,
                        );
                        in_flight.dispatch(resource, RolloutMode::Change);
                    }
                }
                Ok(Event::InitApply(obj)) => {
                    if let Some(resource) = read_resource(&obj) {
                        in_flight.dispatch(resource, RolloutMode::CatchUp);
                    }
                }
                Ok(Event::Delete(obj)) => {
                    debug!(
                        "{} {}/{} deleted, ignoring",
                        kind,
                        obj.namespace().unwrap_or_default(),
                        obj.name_any()
                    );
                }
                Ok(Event::Init) => debug!("{} watch (re)starting", kind),
                Ok(Event::InitDone) => info!("{} watch established", kind),
                Err(e) => warn!("{} watch error: {}", kind, e),
            }
        }

        Ok(())
    }
}

fn read_resource<K: ConfigSource>(obj: &K) -> Option<ConfigResource> {
    match ConfigResource::from_source(obj) {
        Ok(resource) => Some(resource),
        Err(e) => {
            error!(
                "Failed to read {} {}/{}: {}",
                K::CONFIG_KIND,
                obj.namespace().unwrap_or_default(),
                obj.name_any(),
                e
            );
            None
        }
    }
}

/// Background reconciliations, at most one per object
struct InFlight<C> {
    manager: Arc<RolloutManager<C>>,
    tasks: HashMap<String, (RolloutMode, JoinHandle<()>)>,
}

impl<C: ClusterApi + 'static> InFlight<C> {
    fn new(manager: Arc<RolloutManager<C>>) -> Self {
        Self {
            manager,
            tasks: HashMap::new(),
        }
    }

    /// Start reconciling `resource` without waiting for it. A pass still
    /// running or waiting to retry for the same object is aborted; an
    /// interrupted live change is carried over into the new pass.
    fn dispatch(&mut self, resource: ConfigResource, mut mode: RolloutMode) {
        self.tasks.retain(|_, (_, task)| !task.is_finished());

        let key = format!("{}/{}", resource.namespace, resource.name);
        if let Some((previous, task)) = self.tasks.remove(&key) {
            debug!("Superseding pending reconciliation of {}", resource);
            task.abort();
            if previous == RolloutMode::Change {
                mode = RolloutMode::Change;
            }
        }

        let manager = self.manager.clone();
        let task = tokio::spawn(async move {
            reconcile_with_retry(&manager, &resource, mode).await;
        });
        self.tasks.insert(key, (mode, task));
    }
}

/// Reconcile one event, redelivering it with exponential backoff while the
/// API is unavailable
async fn reconcile_with_retry<C: ClusterApi>(
    manager: &RolloutManager<C>,
    resource: &ConfigResource,
    mode: RolloutMode,
) {
    let mut interval = INITIAL_INTERVAL_SECS;

    for attempt in 1..=MAX_ATTEMPTS {
        match manager.apply(resource, mode).await {
            Ok(outcome) => {
                debug!(
                    "Reconciled {}: {} patched, {} failed",
                    resource,
                    outcome.applied.len(),
                    outcome.failed.len()
                );
                return;
            }
            Err(e) if attempt < MAX_ATTEMPTS => {
                warn!(
                    "Reconciliation of {} failed: {}, retrying in {} seconds...",
                    resource, e, interval
                );
                sleep(Duration::from_secs(interval)).await;
                interval = (interval * 2).min(MAX_INTERVAL_SECS);
            }
            Err(e) => {
                error!(
                    "Reconciliation of {} failed after {} attempts: {}",
                    resource, attempt, e
                );
            }
        }
    }
}
