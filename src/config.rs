// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::metrics::DEFAULT_PORT;
use anyhow::{Context, Result};
use std::env;

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Port the `/metrics` and `/healthz` endpoints listen on
    pub metrics_port: u16,
    /// Only watch ConfigMaps and Secrets in this namespace; all namespaces when unset
    pub watch_namespace: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let metrics_port = match lookup("METRICS_PORT") {
            Some(port) => port
                .parse()
                .with_context(|| format!("METRICS_PORT is not a valid port: {}", port))?,
            None => DEFAULT_PORT,
        };

        let watch_namespace = lookup("WATCH_NAMESPACE").filter(|ns| !ns.is_empty());

        Ok(Config {
            metrics_port,
            watch_namespace,
        })
    }
}
