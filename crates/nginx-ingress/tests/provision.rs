//! End-to-end provisioning against a recording sink

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use nginx_ingress::{
    AppliedResource, ComponentOptions, Error, IngressDefaults, NginxIngress, NginxIngressArgs,
    ResourceDescription, ResourceSink, Result,
};
use nginx_ingress_common::telemetry::{init_logging, LogFormat};
use nginx_ingress_common::{ANNOTATION_DEPENDS_ON, LABEL_INSTANCE};

/// Sink that records every submission and optionally rejects one kind
#[derive(Default)]
struct RecordingSink {
    submitted: Mutex<Vec<ResourceDescription>>,
    reject_kind: Option<&'static str>,
}

impl RecordingSink {
    fn rejecting(kind: &'static str) -> Self {
        Self {
            reject_kind: Some(kind),
            ..Default::default()
        }
    }

    fn kinds(&self) -> Vec<String> {
        self.submitted
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.kind().to_string())
            .collect()
    }
}

#[async_trait]
impl ResourceSink for RecordingSink {
    async fn apply(&self, resource: &ResourceDescription) -> Result<AppliedResource> {
        self.submitted.lock().unwrap().push(resource.clone());
        if self.reject_kind == Some(resource.kind()) {
            return Err(Error::internal_with_context(
                "recording_sink",
                format!("{} rejected", resource.kind()),
            ));
        }
        Ok(AppliedResource {
            uid: Some(format!("uid-{}", resource.id)),
            ..AppliedResource::accepted(resource)
        })
    }
}

fn env_defaults(vars: &[(&str, &str)]) -> IngressDefaults {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    IngressDefaults::from_lookup(|key: &str| vars.get(key).cloned()).unwrap()
}

fn chart_values(resource: &ResourceDescription) -> serde_json::Value {
    let yaml = resource.manifest["spec"]["valuesContent"].as_str().unwrap();
    serde_yaml::from_str(yaml).unwrap()
}

#[tokio::test]
async fn test_provisions_namespace_release_and_settings_in_order() {
    let _ = init_logging(LogFormat::Plain);

    let defaults = env_defaults(&[
        ("NGINX_INGRESS_NAMESPACE", "ingress-nginx"),
        ("NGINX_INGRESS_SERVICE_TYPE", "LoadBalancer"),
        ("NGINX_INGRESS_REPLICA_COUNT", "3"),
    ]);
    let component = NginxIngress::new(
        "public",
        NginxIngressArgs {
            replica_count: Some(2),
            ..Default::default()
        },
        ComponentOptions {
            parent: Some("platform".to_string()),
            defaults,
            ..Default::default()
        },
    )
    .unwrap();

    let sink = RecordingSink::default();
    let report = component.provision(&sink).await.unwrap();

    assert_eq!(report.component, "public");
    assert_eq!(sink.kinds(), vec!["Namespace", "HelmChart", "ConfigMap"]);
    let ids: Vec<&str> = report.applied.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["public-ns", "public", "public-config-map"]);
    assert_eq!(report.applied[1].uid.as_deref(), Some("uid-public"));

    let submitted = sink.submitted.lock().unwrap();
    assert_eq!(submitted[0].name, "ingress-nginx");
    assert_eq!(submitted[1].namespace.as_deref(), Some("ingress-nginx"));
    assert_eq!(submitted[2].name, "public-controller");

    let values = chart_values(&submitted[1]);
    assert_eq!(values["controller"]["replicaCount"], 2);
    assert_eq!(values["controller"]["service"]["type"], "LoadBalancer");
    assert_eq!(values["controller"]["hostNetwork"], false);
    assert_eq!(values["controller"]["daemonset"]["useHostPort"], false);

    for resource in submitted.iter() {
        assert_eq!(resource.manifest["metadata"]["labels"][LABEL_INSTANCE], "public");
    }
    assert_eq!(
        submitted[2].manifest["metadata"]["annotations"][ANNOTATION_DEPENDS_ON],
        "public"
    );
}

#[tokio::test]
async fn test_rejected_release_stops_before_settings() {
    let component = NginxIngress::new(
        "public",
        NginxIngressArgs::default(),
        ComponentOptions::default(),
    )
    .unwrap();

    let sink = RecordingSink::rejecting("HelmChart");
    let err = component.provision(&sink).await.unwrap_err();

    assert!(err.to_string().contains("HelmChart rejected"));
    assert_eq!(sink.kinds(), vec!["Namespace", "HelmChart"]);
}

#[tokio::test]
async fn test_caller_falsy_values_beat_defaults() {
    let defaults = env_defaults(&[
        ("NGINX_INGRESS_USE_FORWARDED_HEADERS", "true"),
        ("NGINX_INGRESS_USE_PROXY_PROTOCOL", "true"),
    ]);
    let component = NginxIngress::new(
        "public",
        NginxIngressArgs {
            use_forwarded_headers: Some(false),
            ..Default::default()
        },
        ComponentOptions {
            defaults,
            ..Default::default()
        },
    )
    .unwrap();

    let sink = RecordingSink::default();
    component.provision(&sink).await.unwrap();

    let submitted = sink.submitted.lock().unwrap();
    let data = &submitted[2].manifest["data"];
    assert_eq!(data["use-forwarded-headers"], "false");
    assert_eq!(data["use-proxy-protocol"], "true");
}

#[test]
fn test_dry_run_renders_three_documents() {
    let component = NginxIngress::new(
        "public",
        NginxIngressArgs {
            service_type: Some("NodePort".to_string()),
            node_port_http: Some(30080),
            ..Default::default()
        },
        ComponentOptions::default(),
    )
    .unwrap();

    let docs = component.manifests().unwrap();
    assert_eq!(docs.len(), 3);
    assert!(docs[1].contains("apiVersion: helm.cattle.io/v1"));
    assert!(docs[1].contains("30080"));
    assert!(docs[2].contains("name: public-controller"));
}
