// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace lookup

use crate::error::Result;
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client, ResourceExt};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Get the annotations of a namespace, `None` if it doesn't exist
#[instrument(skip(client))]
pub async fn get_namespace_annotations(
    client: &Client,
    namespace: &str,
) -> Result<Option<BTreeMap<String, String>>> {
    let namespaces: Api<Namespace> = Api::all(client.clone());

    match namespaces.get_opt(namespace).await? {
        Some(ns) => Ok(Some(ns.annotations().clone())),
        None => {
            debug!("Namespace {} does not exist", namespace);
            Ok(None)
        }
    }
}
