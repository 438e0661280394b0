//! Chart values for the ingress controller release
//!
//! Typed mirror of the subset of the chart's `values.yaml` this component
//! sets. Absent optional values are left out so the chart's own defaults apply.

use std::collections::BTreeMap;

use serde::Serialize;

use nginx_ingress_common::{Error, Result};

use crate::args::{DeploymentKind, ResolvedIngress};
use crate::mode::{ExternalTrafficPolicy, ModeFlags, NodePorts};

/// Port the controller serves Prometheus metrics on
pub const METRICS_PORT: &str = "10254";

/// ServiceMonitor scrape interval
pub const SCRAPE_INTERVAL: &str = "10s";

/// Top-level chart values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartValues {
    pub controller: ControllerValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ControllerValues {
    pub kind: DeploymentKind,
    pub replica_count: u32,
    pub service: ServiceValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_class: Option<String>,
    pub daemonset: DaemonSetValues,
    pub host_network: bool,
    pub metrics: MetricsValues,
}

/// Controller Service settings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceValues {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub service_type: Option<String>,
    pub external_traffic_policy: ExternalTrafficPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_ports: Option<NodePorts>,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaemonSetValues {
    pub use_host_port: bool,
}

/// Metrics endpoint, its Service, and the optional ServiceMonitor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsValues {
    pub enabled: bool,
    pub service: MetricsServiceValues,
    pub service_monitor: ServiceMonitorValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsServiceValues {
    #[serde(rename = "type")]
    pub service_type: String,
    pub annotations: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceMonitorValues {
    pub enabled: bool,
    pub scrape_interval: String,
    pub namespace_selector: NamespaceSelector,
    pub namespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamespaceSelector {
    pub any: bool,
}

impl ChartValues {
    /// Build values from the resolved configuration and the mode flags
    pub fn new(spec: &ResolvedIngress, flags: &ModeFlags) -> Self {
        let scrape_annotations = BTreeMap::from([
            ("prometheus.io/scrape".to_string(), "true".to_string()),
            ("prometheus.io/port".to_string(), METRICS_PORT.to_string()),
        ]);

        Self {
            controller: ControllerValues {
                kind: spec.deployment_kind,
                replica_count: spec.replica_count,
                service: ServiceValues {
                    service_type: spec.service_type.service_type().map(str::to_string),
                    external_traffic_policy: flags.external_traffic_policy,
                    node_ports: flags.node_ports,
                    annotations: spec.service_annotations.clone(),
                },
                ingress_class: spec.ingress_class.clone(),
                daemonset: DaemonSetValues {
                    use_host_port: flags.use_host_port,
                },
                host_network: flags.host_network,
                metrics: MetricsValues {
                    enabled: true,
                    service: MetricsServiceValues {
                        service_type: "ClusterIP".to_string(),
                        annotations: scrape_annotations,
                    },
                    service_monitor: ServiceMonitorValues {
                        enabled: spec.enable_service_monitor,
                        scrape_interval: SCRAPE_INTERVAL.to_string(),
                        namespace_selector: NamespaceSelector { any: true },
                        namespace: spec.service_monitor_namespace.clone(),
                    },
                },
            },
        }
    }

    /// Render as a YAML document for the chart's `valuesContent`
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            Error::serialization_for_kind("HelmChart", format!("failed to render values: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::NginxIngressArgs;
    use crate::defaults::IngressDefaults;

    fn values_for(args: NginxIngressArgs) -> serde_json::Value {
        let spec = ResolvedIngress::resolve("edge", &args, &IngressDefaults::default());
        let flags = spec
            .service_type
            .flags(spec.node_port_http, spec.node_port_https);
        serde_json::to_value(ChartValues::new(&spec, &flags)).unwrap()
    }

    #[test]
    fn test_node_port_values() {
        let v = values_for(NginxIngressArgs {
            service_type: Some("NodePort".to_string()),
            node_port_http: Some(30080),
            node_port_https: Some(30443),
            ..Default::default()
        });
        let c = &v["controller"];
        assert_eq!(c["service"]["type"], "NodePort");
        assert_eq!(c["service"]["externalTrafficPolicy"], "Local");
        assert_eq!(c["service"]["nodePorts"]["http"], 30080);
        assert_eq!(c["service"]["nodePorts"]["https"], 30443);
        assert_eq!(c["daemonset"]["useHostPort"], false);
        assert_eq!(c["hostNetwork"], false);
    }

    #[test]
    fn test_unset_service_type_is_omitted() {
        let v = values_for(NginxIngressArgs::default());
        let service = v["controller"]["service"].as_object().unwrap();
        assert!(!service.contains_key("type"));
        assert!(!service.contains_key("nodePorts"));
        assert_eq!(service["externalTrafficPolicy"], "");
        assert_eq!(v["controller"]["daemonset"]["useHostPort"], true);
        assert_eq!(v["controller"]["hostNetwork"], true);
    }

    #[test]
    fn test_topology_and_class() {
        let v = values_for(NginxIngressArgs {
            deployment_kind: Some(DeploymentKind::Deployment),
            replica_count: Some(3),
            ingress_class: Some("public".to_string()),
            service_annotations: Some(BTreeMap::from([(
                "service.beta.kubernetes.io/aws-load-balancer-type".to_string(),
                "nlb".to_string(),
            )])),
            ..Default::default()
        });
        let c = &v["controller"];
        assert_eq!(c["kind"], "Deployment");
        assert_eq!(c["replicaCount"], 3);
        assert_eq!(c["ingressClass"], "public");
        assert_eq!(
            c["service"]["annotations"]["service.beta.kubernetes.io/aws-load-balancer-type"],
            "nlb"
        );
    }

    #[test]
    fn test_metrics_are_always_enabled() {
        let v = values_for(NginxIngressArgs::default());
        let m = &v["controller"]["metrics"];
        assert_eq!(m["enabled"], true);
        assert_eq!(m["service"]["type"], "ClusterIP");
        assert_eq!(m["service"]["annotations"]["prometheus.io/scrape"], "true");
        assert_eq!(m["service"]["annotations"]["prometheus.io/port"], "10254");
        assert_eq!(m["serviceMonitor"]["enabled"], false);
    }

    #[test]
    fn test_service_monitor_defaults_namespace() {
        let v = values_for(NginxIngressArgs {
            enable_service_monitor: Some(true),
            ..Default::default()
        });
        let sm = &v["controller"]["metrics"]["serviceMonitor"];
        assert_eq!(sm["enabled"], true);
        assert_eq!(sm["namespace"], "cattle-prometheus");
        assert_eq!(sm["scrapeInterval"], "10s");
        assert_eq!(sm["namespaceSelector"]["any"], true);
    }

    #[test]
    fn test_yaml_rendering_contains_values() {
        let spec = ResolvedIngress::resolve(
            "edge",
            &NginxIngressArgs::default(),
            &IngressDefaults::default(),
        );
        let flags = spec.service_type.flags(None, None);
        let yaml = ChartValues::new(&spec, &flags).to_yaml().unwrap();
        assert!(yaml.starts_with("controller:"));
        assert!(yaml.contains("kind: DaemonSet"));
        assert!(yaml.contains("scrapeInterval: 10s"));
    }
}
