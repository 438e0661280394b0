//! The nginx ingress component
//!
//! Resolves arguments, derives the mode flags, and builds the three-resource
//! plan: Namespace, then the HelmChart release, then the controller
//! ConfigMap. Submission walks the plan in dependency order and stops at the
//! first rejection. Nothing is retried or rolled back.

use k8s_openapi::api::core::v1::{ConfigMap, Namespace};
use kube::api::ObjectMeta;
use tracing::{debug, info, warn};

use nginx_ingress_common::kube_utils::Ownership;
use nginx_ingress_common::{Error, Result};

use crate::args::{NginxIngressArgs, ResolvedIngress};
use crate::defaults::IngressDefaults;
use crate::helm_chart::{HelmChart, HelmChartSpec};
use crate::mode::{ExposureMode, ModeFlags};
use crate::plan::{ResourceDescription, ResourcePlan};
use crate::settings::{config_map_name, controller_settings};
use crate::sink::{AppliedResource, ResourceSink};
use crate::values::ChartValues;

/// Options that scope the component rather than configure the controller
#[derive(Debug, Clone, Default)]
pub struct ComponentOptions {
    /// Identifier of the enclosing scope, recorded on every resource
    pub parent: Option<String>,
    /// Process-wide defaults for unset arguments
    pub defaults: IngressDefaults,
    /// Reject service types other than ClusterIP, NodePort and LoadBalancer
    pub strict_service_type: bool,
}

/// Outcome of a provisioning run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Component instance name
    pub component: String,
    /// Accepted resources in submission order
    pub applied: Vec<AppliedResource>,
}

/// An nginx ingress controller declaration
#[derive(Debug, Clone)]
pub struct NginxIngress {
    spec: ResolvedIngress,
    flags: ModeFlags,
    plan: ResourcePlan,
}

impl NginxIngress {
    /// Resolve `args` and build the resource plan for component `name`.
    pub fn new(name: &str, args: NginxIngressArgs, options: ComponentOptions) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::config_for_field("name", "component name must not be empty"));
        }

        let spec = ResolvedIngress::resolve(name, &args, &options.defaults);
        if spec.namespace.trim().is_empty() {
            return Err(Error::config_for_field("namespace", "namespace must not be empty"));
        }
        if options.strict_service_type {
            if let ExposureMode::Other(raw) = &spec.service_type {
                ExposureMode::parse_strict(raw)?;
            }
        }

        let flags = spec
            .service_type
            .flags(spec.node_port_http, spec.node_port_https);
        debug!(
            component = %spec.name,
            namespace = %spec.namespace,
            service_type = %spec.service_type,
            host_network = flags.host_network,
            "resolved ingress configuration"
        );

        let mut owner = Ownership::new(name);
        if let Some(parent) = options.parent {
            owner = owner.with_parent(parent);
        }
        let plan = build_plan(&spec, &flags, owner)?;

        Ok(Self { spec, flags, plan })
    }

    /// Resolved configuration
    pub fn spec(&self) -> &ResolvedIngress {
        &self.spec
    }

    /// Flags derived from the exposure mode
    pub fn flags(&self) -> &ModeFlags {
        &self.flags
    }

    /// Resource plan
    pub fn plan(&self) -> &ResourcePlan {
        &self.plan
    }

    /// Plan id of the Namespace
    pub fn namespace_id(&self) -> String {
        namespace_id(&self.spec.name)
    }

    /// Plan id of the HelmChart release
    pub fn release_id(&self) -> String {
        self.spec.name.clone()
    }

    /// Plan id of the controller ConfigMap
    pub fn settings_id(&self) -> String {
        settings_id(&self.spec.name)
    }

    /// Render the plan as YAML documents without contacting the cluster
    pub fn manifests(&self) -> Result<Vec<String>> {
        self.plan.to_yaml_documents()
    }

    /// Submit every resource in dependency order.
    ///
    /// Returns after the last submission is accepted; convergence is left to
    /// the cluster.
    pub async fn provision(&self, sink: &dyn ResourceSink) -> Result<ProvisionReport> {
        let ordered = self.plan.ordered()?;
        info!(
            component = %self.spec.name,
            namespace = %self.spec.namespace,
            resources = ordered.len(),
            "provisioning ingress controller"
        );

        let mut applied = Vec::with_capacity(ordered.len());
        for resource in ordered {
            match sink.apply(resource).await {
                Ok(record) => {
                    debug!(id = %record.id, kind = %record.kind, "resource accepted");
                    applied.push(record);
                }
                Err(e) => {
                    warn!(
                        component = %self.spec.name,
                        id = %resource.id,
                        submitted = applied.len(),
                        error = %e,
                        "resource submission failed"
                    );
                    return Err(e);
                }
            }
        }

        info!(component = %self.spec.name, "ingress controller declared");
        Ok(ProvisionReport {
            component: self.spec.name.clone(),
            applied,
        })
    }
}

fn namespace_id(name: &str) -> String {
    format!("{}-ns", name)
}

fn settings_id(name: &str) -> String {
    format!("{}-config-map", name)
}

fn object_meta(
    owner: &Ownership,
    name: &str,
    namespace: Option<&str>,
    depends_on: &[&str],
) -> ObjectMeta {
    let edges: Vec<String> = depends_on.iter().map(|d| d.to_string()).collect();
    let annotations = owner.annotations(&edges);
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        labels: Some(owner.labels()),
        annotations: (!annotations.is_empty()).then_some(annotations),
        ..Default::default()
    }
}

fn build_plan(spec: &ResolvedIngress, flags: &ModeFlags, owner: Ownership) -> Result<ResourcePlan> {
    let ns_id = namespace_id(&spec.name);
    let release_id = spec.name.clone();
    let cm_id = settings_id(&spec.name);
    let namespace = spec.namespace.as_str();

    let ns = Namespace {
        metadata: object_meta(&owner, namespace, None, &[]),
        ..Default::default()
    };

    let values = ChartValues::new(spec, flags).to_yaml()?;
    let mut release = HelmChart::new(
        &spec.name,
        HelmChartSpec {
            chart: spec.chart.clone(),
            repo: Some(spec.chart_repo.clone()),
            version: spec.version.clone(),
            target_namespace: Some(spec.namespace.clone()),
            values_content: Some(values),
        },
    );
    release.metadata = object_meta(&owner, &spec.name, Some(namespace), &[&ns_id]);

    let settings = ConfigMap {
        metadata: object_meta(
            &owner,
            &config_map_name(&spec.name),
            Some(namespace),
            &[&release_id],
        ),
        data: Some(controller_settings(spec)),
        ..Default::default()
    };

    let mut plan = ResourcePlan::new(owner);
    plan.push(ResourceDescription::from_resource(&ns_id, &ns, &[])?)?;
    plan.push(ResourceDescription::from_resource(
        &release_id,
        &release,
        &[&ns_id],
    )?)?;
    plan.push(ResourceDescription::from_resource(
        &cm_id,
        &settings,
        &[&release_id],
    )?)?;
    Ok(plan)
}
