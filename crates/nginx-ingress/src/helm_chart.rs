//! HelmChart custom resource
//!
//! Chart installs are declared as `helm.cattle.io/v1` HelmChart objects and
//! reconciled by the cluster's helm controller (bundled with k3s and RKE2).
//! Only the fields this component sets are modelled.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a HelmChart
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "helm.cattle.io",
    version = "v1",
    kind = "HelmChart",
    plural = "helmcharts",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct HelmChartSpec {
    /// Chart name within the repository
    pub chart: String,

    /// Chart repository URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Chart version; latest when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Namespace the release is installed into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_namespace: Option<String>,

    /// Values document passed to the chart
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_resource_identity() {
        assert_eq!(HelmChart::api_version(&()), "helm.cattle.io/v1");
        assert_eq!(HelmChart::kind(&()), "HelmChart");
        assert_eq!(HelmChart::plural(&()), "helmcharts");
    }

    #[test]
    fn test_serializes_with_type_meta_and_camel_case() {
        let chart = HelmChart::new(
            "edge",
            HelmChartSpec {
                chart: "nginx-ingress".to_string(),
                target_namespace: Some("ingress".to_string()),
                values_content: Some("controller: {}\n".to_string()),
                ..Default::default()
            },
        );
        let json = serde_json::to_value(&chart).unwrap();
        assert_eq!(json["apiVersion"], "helm.cattle.io/v1");
        assert_eq!(json["kind"], "HelmChart");
        assert_eq!(json["metadata"]["name"], "edge");
        assert_eq!(json["spec"]["targetNamespace"], "ingress");
        assert_eq!(json["spec"]["valuesContent"], "controller: {}\n");
        assert!(json["spec"].get("version").is_none());
    }
}
