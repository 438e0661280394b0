//! nginx ingress controller provisioning
//!
//! Declares an nginx ingress controller as three Kubernetes resources, in
//! dependency order:
//!
//! - a Namespace for the controller
//! - a `helm.cattle.io/v1` HelmChart release of the nginx-ingress chart
//! - the controller settings ConfigMap
//!
//! # Public API
//!
//! - [`NginxIngress`]: resolves [`NginxIngressArgs`] against [`IngressDefaults`]
//!   and builds the [`ResourcePlan`]
//! - [`NginxIngress::provision`]: submits the plan through a [`ResourceSink`]
//! - [`KubeSink`]: server-side apply against a cluster
//! - [`ExposureMode`], [`ModeFlags`]: service type and the flags it drives

pub mod args;
pub mod component;
pub mod defaults;
pub mod helm_chart;
pub mod mode;
pub mod plan;
pub mod settings;
pub mod sink;
pub mod values;

pub use args::{DeploymentKind, NginxIngressArgs, ResolvedIngress};
pub use component::{ComponentOptions, NginxIngress, ProvisionReport};
pub use defaults::IngressDefaults;
pub use helm_chart::{HelmChart, HelmChartSpec};
pub use mode::{ExposureMode, ExternalTrafficPolicy, ModeFlags, NodePorts};
pub use plan::{ResourceDescription, ResourcePlan};
pub use sink::{AppliedResource, KubeSink, ResourceSink};

#[cfg(test)]
pub use sink::MockResourceSink;

pub use nginx_ingress_common::{Error, Result};
