//! Process-wide defaults for the ingress component
//!
//! Defaults fill in any field the caller leaves unset. They are read from
//! `NGINX_INGRESS_*` environment variables or from a YAML file:
//!
//! ```yaml
//! version: 1.41.3
//! namespace: ingress-nginx
//! serviceType: NodePort
//! nodePortHTTP: 30080
//! nodePortHTTPS: 30443
//! replicaCount: 2
//! useProxyProtocol: false
//! useForwardedHeaders: true
//! clientMaxBodySize: 16m
//! ```
//!
//! An empty string from either source means "not set".

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use nginx_ingress_common::{Error, Result};

pub const ENV_VERSION: &str = "NGINX_INGRESS_VERSION";
pub const ENV_NAMESPACE: &str = "NGINX_INGRESS_NAMESPACE";
pub const ENV_SERVICE_TYPE: &str = "NGINX_INGRESS_SERVICE_TYPE";
pub const ENV_INGRESS_CLASS: &str = "NGINX_INGRESS_INGRESS_CLASS";
pub const ENV_NODE_PORT_HTTP: &str = "NGINX_INGRESS_NODE_PORT_HTTP";
pub const ENV_NODE_PORT_HTTPS: &str = "NGINX_INGRESS_NODE_PORT_HTTPS";
pub const ENV_REPLICA_COUNT: &str = "NGINX_INGRESS_REPLICA_COUNT";
pub const ENV_USE_PROXY_PROTOCOL: &str = "NGINX_INGRESS_USE_PROXY_PROTOCOL";
pub const ENV_USE_FORWARDED_HEADERS: &str = "NGINX_INGRESS_USE_FORWARDED_HEADERS";
pub const ENV_CLIENT_MAX_BODY_SIZE: &str = "NGINX_INGRESS_CLIENT_MAX_BODY_SIZE";

/// Fallback values for fields the caller did not set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IngressDefaults {
    /// Chart version
    pub version: Option<String>,
    /// Target namespace
    pub namespace: Option<String>,
    /// Exposure mode (ClusterIP, NodePort, LoadBalancer)
    pub service_type: Option<String>,
    /// Ingress class the controller serves
    pub ingress_class: Option<String>,
    /// HTTP node port (NodePort mode only)
    #[serde(rename = "nodePortHTTP", alias = "nodePortHttp")]
    pub node_port_http: Option<u16>,
    /// HTTPS node port (NodePort mode only)
    #[serde(rename = "nodePortHTTPS", alias = "nodePortHttps")]
    pub node_port_https: Option<u16>,
    /// Controller replica count
    pub replica_count: Option<u32>,
    /// Accept the PROXY protocol on incoming connections
    pub use_proxy_protocol: Option<bool>,
    /// Trust X-Forwarded-* headers
    pub use_forwarded_headers: Option<bool>,
    /// Maximum request body size (nginx size string, e.g. "16m")
    pub client_max_body_size: Option<String>,
}

impl IngressDefaults {
    /// Read defaults from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read defaults through a variable lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            version: get(ENV_VERSION),
            namespace: get(ENV_NAMESPACE),
            service_type: get(ENV_SERVICE_TYPE),
            ingress_class: get(ENV_INGRESS_CLASS),
            node_port_http: parse_var(ENV_NODE_PORT_HTTP, get(ENV_NODE_PORT_HTTP))?,
            node_port_https: parse_var(ENV_NODE_PORT_HTTPS, get(ENV_NODE_PORT_HTTPS))?,
            replica_count: parse_var(ENV_REPLICA_COUNT, get(ENV_REPLICA_COUNT))?,
            use_proxy_protocol: parse_bool(ENV_USE_PROXY_PROTOCOL, get(ENV_USE_PROXY_PROTOCOL))?,
            use_forwarded_headers: parse_bool(
                ENV_USE_FORWARDED_HEADERS,
                get(ENV_USE_FORWARDED_HEADERS),
            )?,
            client_max_body_size: get(ENV_CLIENT_MAX_BODY_SIZE),
        })
    }

    /// Parse defaults from a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let defaults: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid defaults file: {}", e)))?;
        Ok(defaults.without_empty_strings())
    }

    /// Load defaults from a YAML file, returning empty defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(Error::config_for_field(
                    path.display().to_string(),
                    format!("failed to read defaults file: {}", e),
                ))
            }
        };
        Self::from_yaml_str(&content)
    }

    /// Layer `other` on top of `self`: every field set in `other` wins.
    pub fn overlay(self, other: Self) -> Self {
        Self {
            version: other.version.or(self.version),
            namespace: other.namespace.or(self.namespace),
            service_type: other.service_type.or(self.service_type),
            ingress_class: other.ingress_class.or(self.ingress_class),
            node_port_http: other.node_port_http.or(self.node_port_http),
            node_port_https: other.node_port_https.or(self.node_port_https),
            replica_count: other.replica_count.or(self.replica_count),
            use_proxy_protocol: other.use_proxy_protocol.or(self.use_proxy_protocol),
            use_forwarded_headers: other.use_forwarded_headers.or(self.use_forwarded_headers),
            client_max_body_size: other.client_max_body_size.or(self.client_max_body_size),
        }
    }

    fn without_empty_strings(self) -> Self {
        let keep = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        Self {
            version: keep(self.version),
            namespace: keep(self.namespace),
            service_type: keep(self.service_type),
            ingress_class: keep(self.ingress_class),
            client_max_body_size: keep(self.client_max_body_size),
            ..self
        }
    }
}

fn parse_var<T>(key: &str, value: Option<String>) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| {
            v.trim().parse::<T>().map_err(|e| {
                Error::config_for_field(key, format!("invalid value {:?} for {}: {}", v, key, e))
            })
        })
        .transpose()
}

fn parse_bool(key: &str, value: Option<String>) -> Result<Option<bool>> {
    value
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(Error::config_for_field(
                key,
                format!("invalid boolean {:?} for {}", v, key),
            )),
        })
        .transpose()
}
