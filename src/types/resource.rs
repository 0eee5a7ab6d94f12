// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Configuration resources (ConfigMaps and Secrets) as seen by the rollout engine.

use crate::constants::annotations;
use crate::error::Result;
use crate::rollout::fingerprint;
use base64::{engine::general_purpose::STANDARD, Engine};
use k8s_openapi::api::core::v1::{ConfigMap, EnvVar, Secret, Volume};
use k8s_openapi::NamespaceResourceScope;
use kube::{Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;

/// Kind of configuration resource that workloads can consume
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKind {
    Secret,
    ConfigMap,
}

impl ConfigKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigKind::Secret => "Secret",
            ConfigKind::ConfigMap => "ConfigMap",
        }
    }

    /// Annotation key stamped on dependent pod templates, e.g.
    /// `k8s.config.sync.hash/configmap-app-config`
    pub fn tracking_annotation_key(&self, name: &str) -> String {
        format!(
            "{}/{}-{}",
            annotations::HASH,
            self.as_str().to_lowercase(),
            name
        )
    }

    /// Name of the resource of this kind referenced by a single-key env var source
    pub fn env_reference<'a>(&self, var: &'a EnvVar) -> Option<&'a str> {
        let source = var.value_from.as_ref()?;
        match self {
            ConfigKind::Secret => source.secret_key_ref.as_ref().map(|r| r.name.as_str()),
            ConfigKind::ConfigMap => source.config_map_key_ref.as_ref().map(|r| r.name.as_str()),
        }
    }

    /// Name of the resource of this kind mounted by a volume
    pub fn volume_reference<'a>(&self, volume: &'a Volume) -> Option<&'a str> {
        match self {
            ConfigKind::Secret => volume.secret.as_ref()?.secret_name.as_deref(),
            ConfigKind::ConfigMap => volume.config_map.as_ref().map(|c| c.name.as_str()),
        }
    }
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A watched Kubernetes type whose `data` drives rollouts
pub trait ConfigSource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + DeserializeOwned
    + fmt::Debug
    + Send
    + Sync
    + 'static
{
    const CONFIG_KIND: ConfigKind;

    /// The `data` field as string pairs; `None` when the object has no data at all
    fn payload(&self) -> Option<BTreeMap<String, String>>;
}

impl ConfigSource for ConfigMap {
    const CONFIG_KIND: ConfigKind = ConfigKind::ConfigMap;

    fn payload(&self) -> Option<BTreeMap<String, String>> {
        self.data.clone()
    }
}

impl ConfigSource for Secret {
    const CONFIG_KIND: ConfigKind = ConfigKind::Secret;

    // Secret values are hashed in their base64 wire form.
    fn payload(&self) -> Option<BTreeMap<String, String>> {
        self.data.as_ref().map(|data| {
            data.iter()
                .map(|(key, value)| (key.clone(), STANDARD.encode(&value.0)))
                .collect()
        })
    }
}

/// Snapshot of a changed ConfigMap or Secret, built fresh for every event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigResource {
    pub kind: ConfigKind,
    pub namespace: String,
    pub name: String,
    pub data: Option<BTreeMap<String, String>>,
    pub annotations: BTreeMap<String, String>,
    fingerprint: String,
    tracking_key: String,
}

impl ConfigResource {
    pub fn new(
        kind: ConfigKind,
        namespace: impl Into<String>,
        name: impl Into<String>,
        data: Option<BTreeMap<String, String>>,
        annotations: BTreeMap<String, String>,
    ) -> Result<Self> {
        let name = name.into();
        let fingerprint = fingerprint(data.as_ref())?;
        let tracking_key = kind.tracking_annotation_key(&name);

        Ok(Self {
            kind,
            namespace: namespace.into(),
            name,
            data,
            annotations,
            fingerprint,
            tracking_key,
        })
    }

    pub fn from_source<K: ConfigSource>(obj: &K) -> Result<Self> {
        Self::new(
            K::CONFIG_KIND,
            obj.namespace().unwrap_or_default(),
            obj.name_any(),
            obj.payload(),
            obj.annotations().clone(),
        )
    }

    /// Content hash of `data`
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Annotation key recording which content version a workload was rolled for
    pub fn tracking_key(&self) -> &str {
        &self.tracking_key
    }
}

impl fmt::Display for ConfigResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} in {}", self.kind, self.name, self.namespace)
    }
}
