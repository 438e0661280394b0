//! Error types for the nginx-ingress component
//!
//! Errors are structured with fields to aid debugging: each variant carries
//! the resource or configuration field it relates to.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for ingress provisioning
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error outside of a specific resource submission
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// The orchestration API rejected a resource submission
    #[error("failed to apply {kind}/{name}: {source}")]
    Apply {
        /// Kind of the rejected resource (e.g. "HelmChart")
        kind: String,
        /// Name of the rejected resource
        name: String,
        /// The underlying kube-rs error, unchanged
        #[source]
        source: kube::Error,
    },

    /// Invalid process defaults or a rejected configuration value
    #[error("configuration error: {message}")]
    Config {
        /// Description of what's invalid
        message: String,
        /// The offending field or variable name (e.g. "NGINX_INGRESS_REPLICA_COUNT")
        field: Option<String>,
    },

    /// The resource dependency graph is not a valid ordering
    #[error("resource plan error: {message}")]
    Plan {
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Internal/operational error
    #[error("internal error [{context}]: {message}")]
    Internal {
        /// Description of what failed
        message: String,
        /// Context where the error occurred (e.g., "create_client")
        context: String,
    },
}

impl Error {
    /// Create a configuration error without a field reference
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            field: None,
        }
    }

    /// Create a configuration error for a specific field
    pub fn config_for_field(field: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a plan error
    pub fn plan(msg: impl Into<String>) -> Self {
        Self::Plan {
            message: msg.into(),
        }
    }

    /// Wrap a rejected submission with the identity of the resource
    pub fn apply(kind: impl Into<String>, name: impl Into<String>, source: kube::Error) -> Self {
        Self::Apply {
            kind: kind.into(),
            name: name.into(),
            source,
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: UNKNOWN_CONTEXT.to_string(),
        }
    }

    /// Create an internal error with context
    pub fn internal_with_context(context: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Internal {
            message: msg.into(),
            context: context.into(),
        }
    }

    /// The configuration field this error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Config { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}
