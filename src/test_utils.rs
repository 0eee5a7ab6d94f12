// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: an in-memory cluster and a mock Kubernetes API server.

use crate::error::{ConfigSyncError, Result};
use crate::kubernetes::ClusterApi;
use crate::types::{PatchOperation, WorkloadCandidate, WorkloadKind};
use async_trait::async_trait;
use http::header::CONTENT_TYPE;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::{
    ConfigMapKeySelector, ConfigMapVolumeSource, Container, EnvVar, EnvVarSource, PodSpec,
    SecretKeySelector, SecretVolumeSource, Volume,
};
use kube::client::Body;
use kube::Client;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tower::Service;

/// A request received by [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: String,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for PATCH requests matching the exact path
    pub fn on_patch(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PATCH", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();
        let query = req.uri().query().unwrap_or_default().to_string();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes().to_vec();
            requests.lock().unwrap().push(RecordedRequest {
                method,
                path,
                query,
                content_type,
                body,
            });

            let (status, body) = response.unwrap_or_else(|| {
                // Default 404 for unmatched requests
                (404, status_json(404, "NotFound", "not found"))
            });

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a mock namespace JSON response
pub fn namespace_json(name: &str, annotations: &[(&str, &str)]) -> String {
    let annotations: BTreeMap<&str, &str> = annotations.iter().copied().collect();
    json!({
        "apiVersion": "v1",
        "kind": "Namespace",
        "metadata": {
            "name": name,
            "uid": "test-uid",
            "annotations": annotations
        }
    })
    .to_string()
}

/// Create a Status failure response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Wrap items in a list response
pub fn list_json(kind: &str, items: Vec<Value>) -> String {
    json!({
        "apiVersion": "apps/v1",
        "kind": kind,
        "metadata": {"resourceVersion": "1"},
        "items": items
    })
    .to_string()
}

/// A Deployment in `ns1`, optionally mounting a ConfigMap volume
pub fn deployment_json(
    name: &str,
    config_map_volume: Option<&str>,
    template_annotations: &[(&str, &str)],
) -> Value {
    let annotations: BTreeMap<&str, &str> = template_annotations.iter().copied().collect();
    let volumes: Vec<Value> = config_map_volume
        .map(|cm| json!({"name": "config", "configMap": {"name": cm}}))
        .into_iter()
        .collect();

    json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": "ns1"},
        "spec": {
            "selector": {"matchLabels": {"app": name}},
            "template": {
                "metadata": {
                    "labels": {"app": name},
                    "annotations": annotations
                },
                "spec": {
                    "containers": [{"name": "app", "image": "nginx"}],
                    "volumes": volumes
                }
            }
        }
    })
}

fn container_with_env(var: EnvVar) -> Container {
    Container {
        name: "app".to_string(),
        env: Some(vec![var]),
        ..Default::default()
    }
}

/// Pod spec with a `secretKeyRef` env var
pub fn secret_env_spec(secret: &str) -> PodSpec {
    PodSpec {
        containers: vec![container_with_env(EnvVar {
            name: "PASSWORD".to_string(),
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    name: secret.to_string(),
                    key: "password".to_string(),
                    optional: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        })],
        ..Default::default()
    }
}

/// Pod spec with a `configMapKeyRef` env var
pub fn config_map_env_spec(config_map: &str) -> PodSpec {
    PodSpec {
        containers: vec![container_with_env(EnvVar {
            name: "LOG_LEVEL".to_string(),
            value_from: Some(EnvVarSource {
                config_map_key_ref: Some(ConfigMapKeySelector {
                    name: config_map.to_string(),
                    key: "level".to_string(),
                    optional: None,
                }),
                ..Default::default()
            }),
            ..Default::default()
        })],
        ..Default::default()
    }
}

/// Pod spec mounting a Secret volume
pub fn secret_volume_spec(secret: &str) -> PodSpec {
    PodSpec {
        containers: vec![Container {
            name: "app".to_string(),
            ..Default::default()
        }],
        volumes: Some(vec![Volume {
            name: "secret".to_string(),
            secret: Some(SecretVolumeSource {
                secret_name: Some(secret.to_string()),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// Pod spec mounting a ConfigMap volume
pub fn config_map_volume_spec(config_map: &str) -> PodSpec {
    PodSpec {
        containers: vec![Container {
            name: "app".to_string(),
            ..Default::default()
        }],
        volumes: Some(vec![Volume {
            name: "config".to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: config_map.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }]),
        ..Default::default()
    }
}

/// A workload in `ns1` without template annotations
pub fn workload(kind: WorkloadKind, name: &str, spec: PodSpec) -> WorkloadCandidate {
    WorkloadCandidate {
        kind,
        namespace: "ns1".to_string(),
        name: name.to_string(),
        pod_spec: Some(spec),
        template_annotations: BTreeMap::new(),
    }
}

impl WorkloadCandidate {
    pub fn with_template_annotation(mut self, key: &str, value: &str) -> Self {
        self.template_annotations
            .insert(key.to_string(), value.to_string());
        self
    }
}

fn api_error(code: u16, reason: &str) -> ConfigSyncError {
    ConfigSyncError::KubeError(kube::Error::Api(kube::error::ErrorResponse {
        status: "Failure".to_string(),
        message: format!("fake cluster: {}", reason),
        reason: reason.to_string(),
        code,
    }))
}

/// In-memory cluster; applied patches are written back to the stored workloads.
#[derive(Default)]
pub struct FakeCluster {
    namespaces: HashMap<String, BTreeMap<String, String>>,
    workloads: Mutex<Vec<WorkloadCandidate>>,
    failing_patches: HashSet<String>,
    failing_list: bool,
    unreachable: bool,
    namespace_lookups: AtomicUsize,
    patch_attempts: Mutex<Vec<PatchOperation>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, name: &str, annotations: &[(&str, &str)]) -> Self {
        self.namespaces.insert(
            name.to_string(),
            annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        );
        self
    }

    pub fn with_workload(self, workload: WorkloadCandidate) -> Self {
        self.workloads.lock().unwrap().push(workload);
        self
    }

    /// Patches to the workload named `name` are rejected
    pub fn failing_patch(mut self, name: &str) -> Self {
        self.failing_patches.insert(name.to_string());
        self
    }

    /// Workload listing fails
    pub fn failing_list(mut self) -> Self {
        self.failing_list = true;
        self
    }

    /// Every call fails
    pub fn unreachable(mut self) -> Self {
        self.unreachable = true;
        self
    }

    pub fn namespace_lookups(&self) -> usize {
        self.namespace_lookups.load(Ordering::SeqCst)
    }

    /// Every patch attempted, successful or not
    pub fn patch_attempts(&self) -> Vec<PatchOperation> {
        self.patch_attempts.lock().unwrap().clone()
    }

    pub fn workload(&self, kind: WorkloadKind, name: &str) -> Option<WorkloadCandidate> {
        self.workloads
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.kind == kind && w.name == name)
            .cloned()
    }
}

#[async_trait]
impl ClusterApi for FakeCluster {
    async fn namespace_annotations(
        &self,
        namespace: &str,
    ) -> Result<Option<BTreeMap<String, String>>> {
        self.namespace_lookups.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(api_error(503, "ServiceUnavailable"));
        }
        Ok(self.namespaces.get(namespace).cloned())
    }

    async fn list_workloads(
        &self,
        kind: WorkloadKind,
        namespace: &str,
    ) -> Result<Vec<WorkloadCandidate>> {
        if self.unreachable || self.failing_list {
            return Err(api_error(503, "ServiceUnavailable"));
        }
        Ok(self
            .workloads
            .lock()
            .unwrap()
            .iter()
            .filter(|w| w.kind == kind && w.namespace == namespace)
            .cloned()
            .collect())
    }

    async fn patch_workload(&self, patch: &PatchOperation) -> Result<()> {
        self.patch_attempts.lock().unwrap().push(patch.clone());
        if self.unreachable || self.failing_patches.contains(&patch.name) {
            return Err(api_error(422, "Invalid"));
        }

        let mut workloads = self.workloads.lock().unwrap();
        let workload = workloads
            .iter_mut()
            .find(|w| {
                w.kind == patch.workload_kind
                    && w.namespace == patch.namespace
                    && w.name == patch.name
            })
            .ok_or_else(|| api_error(404, "NotFound"))?;
        workload
            .template_annotations
            .insert(patch.annotation_key.clone(), patch.annotation_value.clone());
        Ok(())
    }
}
