//! Exposure mode selection
//!
//! The exposure mode decides how the controller's Service is reached and, as a
//! pure function of the mode, whether the controller binds host ports, runs in
//! the host network namespace, and which external traffic policy applies.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use nginx_ingress_common::{Error, Result};

/// How the controller's network endpoint is made reachable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExposureMode {
    /// Cluster-internal Service; traffic enters through host ports
    ClusterIp,
    /// Static per-node ports
    NodePort,
    /// External load balancer
    LoadBalancer,
    /// No mode configured anywhere
    #[default]
    Unset,
    /// A mode this component doesn't know; passed through to the chart verbatim
    Other(String),
}

impl ExposureMode {
    /// Parse a mode leniently: unknown strings become [`ExposureMode::Other`].
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some("") => Self::Unset,
            Some("ClusterIP") => Self::ClusterIp,
            Some("NodePort") => Self::NodePort,
            Some("LoadBalancer") => Self::LoadBalancer,
            Some(other) => Self::Other(other.to_string()),
        }
    }

    /// Parse a mode, rejecting anything outside the three known variants.
    pub fn parse_strict(value: &str) -> Result<Self> {
        match Self::parse(Some(value)) {
            Self::Other(_) | Self::Unset => Err(Error::config_for_field(
                "serviceType",
                format!(
                    "unsupported service type {:?}; expected ClusterIP, NodePort or LoadBalancer",
                    value
                ),
            )),
            mode => Ok(mode),
        }
    }

    /// Service type string handed to the chart, if any
    pub fn service_type(&self) -> Option<&str> {
        match self {
            Self::ClusterIp => Some("ClusterIP"),
            Self::NodePort => Some("NodePort"),
            Self::LoadBalancer => Some("LoadBalancer"),
            Self::Unset => None,
            Self::Other(s) => Some(s.as_str()),
        }
    }

    /// Derive the low-level flags for this mode.
    ///
    /// Node ports are only carried in `NodePort` mode; every other mode,
    /// including unknown ones, gets the host-network defaults.
    pub fn flags(&self, node_port_http: Option<u16>, node_port_https: Option<u16>) -> ModeFlags {
        match self {
            Self::NodePort => ModeFlags {
                use_host_port: false,
                host_network: false,
                external_traffic_policy: ExternalTrafficPolicy::Local,
                node_ports: Some(NodePorts {
                    http: node_port_http,
                    https: node_port_https,
                }),
            },
            Self::LoadBalancer => ModeFlags {
                use_host_port: false,
                host_network: false,
                external_traffic_policy: ExternalTrafficPolicy::Local,
                node_ports: None,
            },
            Self::Other(mode) => {
                warn!(service_type = %mode, "unrecognized service type, using host network defaults");
                ModeFlags::default()
            }
            Self::ClusterIp | Self::Unset => ModeFlags::default(),
        }
    }
}

impl fmt::Display for ExposureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.service_type().unwrap_or(""))
    }
}

/// External traffic policy of the controller Service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExternalTrafficPolicy {
    /// Left to the chart (rendered as an empty string)
    #[default]
    Unset,
    /// Preserve client source IPs by only routing to node-local endpoints
    Local,
}

impl ExternalTrafficPolicy {
    /// Value as rendered into chart values
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unset => "",
            Self::Local => "Local",
        }
    }
}

impl Serialize for ExternalTrafficPolicy {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Static node ports for HTTP and HTTPS
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NodePorts {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub https: Option<u16>,
}

/// Flags derived from the exposure mode. Never set independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeFlags {
    /// Bind the controller's container ports on the host
    pub use_host_port: bool,
    /// Run the controller in the host network namespace
    pub host_network: bool,
    /// External traffic policy of the controller Service
    pub external_traffic_policy: ExternalTrafficPolicy,
    /// Node ports, only in NodePort mode
    pub node_ports: Option<NodePorts>,
}

impl Default for ModeFlags {
    fn default() -> Self {
        Self {
            use_host_port: true,
            host_network: true,
            external_traffic_policy: ExternalTrafficPolicy::Unset,
            node_ports: None,
        }
    }
}
