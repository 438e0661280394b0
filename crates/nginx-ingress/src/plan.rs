//! Resource plan: descriptions plus explicit dependency edges
//!
//! Each description carries a stable id (unique within the plan) and the ids
//! it depends on. The plan orders descriptions so every resource follows its
//! dependencies; declaration order only breaks ties.

use std::collections::HashSet;

use kube::discovery::ApiResource;
use kube::Resource;
use serde::Serialize;

use nginx_ingress_common::kube_utils::Ownership;
use nginx_ingress_common::{Error, Result};

/// One declarative resource to submit
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescription {
    /// Logical id within the plan (e.g. "edge-ns")
    pub id: String,
    /// API coordinates for submission
    pub api_resource: ApiResource,
    /// `metadata.name`
    pub name: String,
    /// `metadata.namespace`, `None` for cluster-scoped kinds
    pub namespace: Option<String>,
    /// Full manifest including apiVersion and kind
    pub manifest: serde_json::Value,
    /// Ids that must be submitted first
    pub depends_on: Vec<String>,
}

impl ResourceDescription {
    /// Describe a typed resource
    pub fn from_resource<K>(id: impl Into<String>, resource: &K, depends_on: &[&str]) -> Result<Self>
    where
        K: Resource<DynamicType = ()> + Serialize,
    {
        let kind = K::kind(&()).to_string();
        let name = resource.meta().name.clone().ok_or_else(|| {
            Error::serialization_for_kind(kind.clone(), "resource has no metadata.name")
        })?;
        let manifest = serde_json::to_value(resource).map_err(|e| {
            Error::serialization_for_kind(kind.clone(), format!("failed to serialize: {}", e))
        })?;

        Ok(Self {
            id: id.into(),
            api_resource: ApiResource::erase::<K>(&()),
            name,
            namespace: resource.meta().namespace.clone(),
            manifest,
            depends_on: depends_on.iter().map(|d| d.to_string()).collect(),
        })
    }

    /// Resource kind
    pub fn kind(&self) -> &str {
        &self.api_resource.kind
    }
}

/// Ordered set of resource descriptions owned by one component
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePlan {
    owner: Ownership,
    resources: Vec<ResourceDescription>,
}

impl ResourcePlan {
    /// Empty plan for an owner
    pub fn new(owner: Ownership) -> Self {
        Self {
            owner,
            resources: Vec::new(),
        }
    }

    /// Owner of every resource in the plan
    pub fn owner(&self) -> &Ownership {
        &self.owner
    }

    /// Add a description; ids must be unique
    pub fn push(&mut self, resource: ResourceDescription) -> Result<()> {
        if self.resources.iter().any(|r| r.id == resource.id) {
            return Err(Error::plan(format!("duplicate resource id {}", resource.id)));
        }
        self.resources.push(resource);
        Ok(())
    }

    /// Descriptions in declaration order
    pub fn resources(&self) -> &[ResourceDescription] {
        &self.resources
    }

    /// Look up a description by id
    pub fn get(&self, id: &str) -> Option<&ResourceDescription> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Descriptions in dependency order.
    ///
    /// Fails on a dependency that isn't in the plan or on a cycle.
    pub fn ordered(&self) -> Result<Vec<&ResourceDescription>> {
        let ids: HashSet<&str> = self.resources.iter().map(|r| r.id.as_str()).collect();
        for resource in &self.resources {
            for dep in &resource.depends_on {
                if !ids.contains(dep.as_str()) {
                    return Err(Error::plan(format!(
                        "{} depends on unknown resource {}",
                        resource.id, dep
                    )));
                }
            }
        }

        let mut ordered: Vec<&ResourceDescription> = Vec::with_capacity(self.resources.len());
        let mut done: HashSet<&str> = HashSet::new();
        while ordered.len() < self.resources.len() {
            let next = self.resources.iter().find(|r| {
                !done.contains(r.id.as_str())
                    && r.depends_on.iter().all(|d| done.contains(d.as_str()))
            });
            match next {
                Some(resource) => {
                    done.insert(resource.id.as_str());
                    ordered.push(resource);
                }
                None => {
                    let stuck: Vec<&str> = self
                        .resources
                        .iter()
                        .map(|r| r.id.as_str())
                        .filter(|id| !done.contains(id))
                        .collect();
                    return Err(Error::plan(format!(
                        "dependency cycle among {}",
                        stuck.join(", ")
                    )));
                }
            }
        }
        Ok(ordered)
    }

    /// Render the plan as YAML documents in dependency order
    pub fn to_yaml_documents(&self) -> Result<Vec<String>> {
        self.ordered()?
            .into_iter()
            .map(|r| {
                serde_yaml::to_string(&r.manifest)
                    .map(|doc| format!("---\n{}", doc))
                    .map_err(|e| {
                        Error::serialization_for_kind(
                            r.kind(),
                            format!("failed to render {}: {}", r.id, e),
                        )
                    })
            })
            .collect()
    }
}
