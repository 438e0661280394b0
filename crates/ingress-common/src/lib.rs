//! Common types for the nginx-ingress component: errors, Kubernetes helpers, logging

#![deny(missing_docs)]

pub mod error;
pub mod kube_utils;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Field manager used for server-side apply
pub const FIELD_MANAGER: &str = "nginx-ingress";

/// Standard Kubernetes label naming the tool that manages a resource
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";

/// Value of [`LABEL_MANAGED_BY`] on every emitted resource
pub const LABEL_MANAGED_BY_VALUE: &str = "nginx-ingress";

/// Standard Kubernetes label naming the application a resource belongs to
pub const LABEL_PART_OF: &str = "app.kubernetes.io/part-of";

/// Value of [`LABEL_PART_OF`] on every emitted resource
pub const LABEL_PART_OF_VALUE: &str = "nginx-ingress";

/// Standard Kubernetes label naming the owning component instance
pub const LABEL_INSTANCE: &str = "app.kubernetes.io/instance";

/// Annotation holding the enclosing scope identifier
pub const ANNOTATION_PARENT: &str = "nginx-ingress.io/parent";

/// Annotation listing the ids of resources that must exist first
pub const ANNOTATION_DEPENDS_ON: &str = "nginx-ingress.io/depends-on";
