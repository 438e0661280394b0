//! Shared Kubernetes utilities using kube-rs
//!
//! Client construction, ownership metadata, and server-side apply of dynamic
//! objects.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use kube::api::{Api, DynamicObject, Patch, PatchParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::discovery::ApiResource;
use kube::{Client, Config};
use tracing::trace;

use crate::{
    Error, ANNOTATION_DEPENDS_ON, ANNOTATION_PARENT, LABEL_INSTANCE, LABEL_MANAGED_BY,
    LABEL_MANAGED_BY_VALUE, LABEL_PART_OF, LABEL_PART_OF_VALUE,
};

// =============================================================================
// Ownership - grouping metadata stamped on every emitted resource
// =============================================================================

/// Ownership scope for resources emitted by one component instance.
///
/// Every resource description built for a component carries the same
/// ownership labels so the whole group can be selected (and withdrawn) by the
/// orchestrator. The optional parent is an opaque identifier of the enclosing
/// scope, recorded as an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ownership {
    /// Component instance name
    pub component: String,
    /// Identifier of the enclosing scope, if any
    pub parent: Option<String>,
}

impl Ownership {
    /// Ownership for a top-level component
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            parent: None,
        }
    }

    /// Set the enclosing scope identifier
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Labels identifying the owning component
    pub fn labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(
            LABEL_MANAGED_BY.to_string(),
            LABEL_MANAGED_BY_VALUE.to_string(),
        );
        labels.insert(LABEL_PART_OF.to_string(), LABEL_PART_OF_VALUE.to_string());
        labels.insert(LABEL_INSTANCE.to_string(), self.component.clone());
        labels
    }

    /// Annotations recording the parent scope and the dependency edges of a resource
    pub fn annotations(&self, depends_on: &[String]) -> BTreeMap<String, String> {
        let mut annotations = BTreeMap::new();
        if let Some(parent) = &self.parent {
            annotations.insert(ANNOTATION_PARENT.to_string(), parent.clone());
        }
        if !depends_on.is_empty() {
            annotations.insert(ANNOTATION_DEPENDS_ON.to_string(), depends_on.join(","));
        }
        annotations
    }
}

// =============================================================================
// Client construction
// =============================================================================

/// Default connection timeout for kube clients
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default read timeout for kube clients
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Create a kube client from optional kubeconfig path with default timeouts
pub async fn create_client(kubeconfig: Option<&Path>) -> Result<Client, Error> {
    create_client_with_timeout(kubeconfig, DEFAULT_CONNECT_TIMEOUT, DEFAULT_READ_TIMEOUT).await
}

/// Create a kube client from optional kubeconfig path with custom timeouts
///
/// Without a path the configuration is inferred (in-cluster service account,
/// then `KUBECONFIG` / `~/.kube/config`).
pub async fn create_client_with_timeout(
    kubeconfig: Option<&Path>,
    connect_timeout: Duration,
    read_timeout: Duration,
) -> Result<Client, Error> {
    let mut config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
                Error::internal_with_context(
                    "create_client",
                    format!("failed to read kubeconfig {}: {}", path.display(), e),
                )
            })?;
            Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .map_err(|e| {
                    Error::internal_with_context(
                        "create_client",
                        format!("failed to load kubeconfig: {}", e),
                    )
                })?
        }
        None => Config::infer().await.map_err(|e| {
            Error::internal_with_context("create_client", format!("failed to infer config: {}", e))
        })?,
    };
    config.connect_timeout = Some(connect_timeout);
    config.read_timeout = Some(read_timeout);
    Ok(Client::try_from(config)?)
}

// =============================================================================
// Server-side apply
// =============================================================================

/// Apply a manifest as a dynamic object using server-side apply.
///
/// Ownership conflicts are forced so repeated invocations converge on the
/// declared state. Returns `kube::Error` so callers can attach the resource
/// identity to their own error type.
pub async fn apply_dynamic(
    client: &Client,
    api_resource: &ApiResource,
    name: &str,
    namespace: Option<&str>,
    manifest: &serde_json::Value,
    field_manager: &str,
) -> Result<DynamicObject, kube::Error> {
    let api: Api<DynamicObject> = match namespace {
        Some(ns) => Api::namespaced_with(client.clone(), ns, api_resource),
        None => Api::all_with(client.clone(), api_resource),
    };
    let params = PatchParams::apply(field_manager).force();
    let applied = api.patch(name, &params, &Patch::Apply(manifest)).await?;
    trace!(kind = %api_resource.kind, name = %name, namespace = ?namespace, "applied manifest");
    Ok(applied)
}
