//! Component arguments and parameter resolution
//!
//! Every argument is optional. Resolution takes the caller's value if it is
//! set, then the process default, then the literal fallback for that field.
//! Presence is explicit: `Some(0)`, `Some("")` and `Some(false)` are real
//! overrides and are never replaced by a default.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::defaults::IngressDefaults;
use crate::mode::ExposureMode;

/// Chart installed when the caller doesn't name one
pub const DEFAULT_CHART: &str = "nginx-ingress";

/// Repository the chart is fetched from when the caller doesn't name one
pub const DEFAULT_CHART_REPO: &str = "https://kubernetes-charts.storage.googleapis.com";

/// Namespace the ServiceMonitor is created in when monitoring is enabled
pub const DEFAULT_SERVICE_MONITOR_NAMESPACE: &str = "cattle-prometheus";

pub const DEFAULT_REPLICA_COUNT: u32 = 1;
pub const DEFAULT_USE_PROXY_PROTOCOL: bool = false;
pub const DEFAULT_USE_FORWARDED_HEADERS: bool = true;

/// Workload kind the chart deploys the controller as
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeploymentKind {
    /// One controller per node
    #[default]
    DaemonSet,
    /// `replicaCount` controllers scheduled anywhere
    Deployment,
}

/// Caller-supplied arguments; every field may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct NginxIngressArgs {
    /// Chart version
    pub version: Option<String>,
    /// Target namespace
    pub namespace: Option<String>,
    /// Exposure mode (ClusterIP, NodePort, LoadBalancer)
    pub service_type: Option<String>,
    /// Ingress class the controller serves
    pub ingress_class: Option<String>,
    /// HTTP node port, only used in NodePort mode
    #[serde(rename = "nodePortHTTP", alias = "nodePortHttp")]
    pub node_port_http: Option<u16>,
    /// HTTPS node port, only used in NodePort mode
    #[serde(rename = "nodePortHTTPS", alias = "nodePortHttps")]
    pub node_port_https: Option<u16>,
    /// Controller replica count
    pub replica_count: Option<u32>,
    /// Accept the PROXY protocol on incoming connections
    pub use_proxy_protocol: Option<bool>,
    /// Trust X-Forwarded-* headers
    pub use_forwarded_headers: Option<bool>,
    /// Maximum request body size (nginx size string)
    pub client_max_body_size: Option<String>,
    /// Workload kind
    pub deployment_kind: Option<DeploymentKind>,
    /// Annotations for the controller Service
    pub service_annotations: Option<BTreeMap<String, String>>,
    /// Take the client address from the `CF-Connecting-IP` header
    pub real_ip_from_cloudflare: Option<bool>,
    /// Create a prometheus-operator ServiceMonitor for controller metrics
    pub enable_service_monitor: Option<bool>,
    /// Namespace for the ServiceMonitor
    pub service_monitor_namespace: Option<String>,
    /// Chart name
    pub chart: Option<String>,
    /// Chart repository URL
    pub chart_repo: Option<String>,
}

/// Fully resolved configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedIngress {
    /// Component instance name; also the chart release name
    pub name: String,
    /// Target namespace
    pub namespace: String,
    /// Chart name
    pub chart: String,
    /// Chart repository URL
    pub chart_repo: String,
    /// Chart version; the repository's latest when absent
    pub version: Option<String>,
    /// Exposure mode
    pub service_type: ExposureMode,
    /// Ingress class
    pub ingress_class: Option<String>,
    /// HTTP node port
    pub node_port_http: Option<u16>,
    /// HTTPS node port
    pub node_port_https: Option<u16>,
    /// Controller replica count
    pub replica_count: u32,
    /// Accept the PROXY protocol
    pub use_proxy_protocol: bool,
    /// Trust X-Forwarded-* headers
    pub use_forwarded_headers: bool,
    /// Maximum request body size
    pub client_max_body_size: Option<String>,
    /// Workload kind
    pub deployment_kind: DeploymentKind,
    /// Controller Service annotations
    pub service_annotations: BTreeMap<String, String>,
    /// Trusted-edge real-IP extraction
    pub real_ip_from_cloudflare: bool,
    /// ServiceMonitor enabled
    pub enable_service_monitor: bool,
    /// ServiceMonitor namespace
    pub service_monitor_namespace: String,
}

impl ResolvedIngress {
    /// Resolve caller arguments against process defaults.
    ///
    /// The namespace falls back to the component name when neither the caller
    /// nor the defaults provide one.
    pub fn resolve(name: &str, args: &NginxIngressArgs, defaults: &IngressDefaults) -> Self {
        let args = args.clone();
        let defaults = defaults.clone();

        Self {
            name: name.to_string(),
            namespace: args
                .namespace
                .or(defaults.namespace)
                .unwrap_or_else(|| name.to_string()),
            chart: args.chart.unwrap_or_else(|| DEFAULT_CHART.to_string()),
            chart_repo: args
                .chart_repo
                .unwrap_or_else(|| DEFAULT_CHART_REPO.to_string()),
            version: args.version.or(defaults.version),
            service_type: ExposureMode::parse(
                args.service_type
                    .filter(|s| !s.trim().is_empty())
                    .or(defaults.service_type)
                    .as_deref(),
            ),
            ingress_class: args.ingress_class.or(defaults.ingress_class),
            node_port_http: args.node_port_http.or(defaults.node_port_http),
            node_port_https: args.node_port_https.or(defaults.node_port_https),
            replica_count: args
                .replica_count
                .or(defaults.replica_count)
                .unwrap_or(DEFAULT_REPLICA_COUNT),
            use_proxy_protocol: args
                .use_proxy_protocol
                .or(defaults.use_proxy_protocol)
                .unwrap_or(DEFAULT_USE_PROXY_PROTOCOL),
            use_forwarded_headers: args
                .use_forwarded_headers
                .or(defaults.use_forwarded_headers)
                .unwrap_or(DEFAULT_USE_FORWARDED_HEADERS),
            client_max_body_size: args.client_max_body_size.or(defaults.client_max_body_size),
            deployment_kind: args.deployment_kind.unwrap_or_default(),
            service_annotations: args.service_annotations.unwrap_or_default(),
            real_ip_from_cloudflare: args.real_ip_from_cloudflare.unwrap_or(false),
            enable_service_monitor: args.enable_service_monitor.unwrap_or(false),
            service_monitor_namespace: args
                .service_monitor_namespace
                .unwrap_or_else(|| DEFAULT_SERVICE_MONITOR_NAMESPACE.to_string()),
        }
    }
}
