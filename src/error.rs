// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigSyncError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("Failed to serialize resource data: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Metrics registration failed: {0}")]
    MetricsError(#[from] prometheus::Error),
}

pub type Result<T> = std::result::Result<T, ConfigSyncError>;
