//! Submission of resource descriptions to the orchestration API
//!
//! Provides a trait-based abstraction so tests can mock submissions while
//! production code applies to a cluster with server-side apply.

use std::path::Path;

use async_trait::async_trait;
use kube::Client;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

use nginx_ingress_common::kube_utils::{apply_dynamic, create_client};
use nginx_ingress_common::{Error, Result, FIELD_MANAGER};

use crate::plan::ResourceDescription;

/// What the orchestration API accepted for one description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedResource {
    /// Plan id of the description
    pub id: String,
    /// Resource kind
    pub kind: String,
    /// `metadata.name`
    pub name: String,
    /// `metadata.namespace`
    pub namespace: Option<String>,
    /// Server-assigned uid, when the API reports one
    pub uid: Option<String>,
    /// Server-assigned resourceVersion, when the API reports one
    pub resource_version: Option<String>,
}

impl AppliedResource {
    /// Record for a description the API accepted without reporting server fields
    pub fn accepted(resource: &ResourceDescription) -> Self {
        Self {
            id: resource.id.clone(),
            kind: resource.kind().to_string(),
            name: resource.name.clone(),
            namespace: resource.namespace.clone(),
            uid: None,
            resource_version: None,
        }
    }
}

/// Destination for resource descriptions
///
/// `apply` returns once the API has accepted the declaration; it does not
/// wait for the resource to converge.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceSink: Send + Sync {
    /// Submit one description
    async fn apply(&self, resource: &ResourceDescription) -> Result<AppliedResource>;
}

/// Sink that applies descriptions to a Kubernetes cluster
pub struct KubeSink {
    client: Client,
    field_manager: String,
}

impl KubeSink {
    /// Create a sink for an existing client
    pub fn new(client: Client) -> Self {
        Self {
            client,
            field_manager: FIELD_MANAGER.to_string(),
        }
    }

    /// Create a sink from an optional kubeconfig path
    pub async fn connect(kubeconfig: Option<&Path>) -> Result<Self> {
        Ok(Self::new(create_client(kubeconfig).await?))
    }

    /// Override the server-side apply field manager
    pub fn with_field_manager(mut self, field_manager: impl Into<String>) -> Self {
        self.field_manager = field_manager.into();
        self
    }
}

#[async_trait]
impl ResourceSink for KubeSink {
    async fn apply(&self, resource: &ResourceDescription) -> Result<AppliedResource> {
        debug!(
            id = %resource.id,
            kind = %resource.kind(),
            name = %resource.name,
            namespace = ?resource.namespace,
            "applying resource"
        );
        let applied = apply_dynamic(
            &self.client,
            &resource.api_resource,
            &resource.name,
            resource.namespace.as_deref(),
            &resource.manifest,
            &self.field_manager,
        )
        .await
        .map_err(|e| Error::apply(resource.kind(), &resource.name, e))?;

        Ok(AppliedResource {
            uid: applied.metadata.uid.clone(),
            resource_version: applied.metadata.resource_version.clone(),
            ..AppliedResource::accepted(resource)
        })
    }
}
