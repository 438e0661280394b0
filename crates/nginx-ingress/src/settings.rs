//! Controller runtime settings
//!
//! Key/value data for the ConfigMap the controller reads on startup and
//! reload. Besides the caller-driven flags it pins a fixed set of tuning
//! values.

use std::collections::BTreeMap;

use crate::args::ResolvedIngress;

/// Snippet that takes the client address from Cloudflare's header
pub const CLOUDFLARE_REAL_IP_SNIPPET: &str = "real_ip_header CF-Connecting-IP;";

/// Tuning values emitted regardless of input
pub const FIXED_SETTINGS: &[(&str, &str)] = &[
    ("http-redirect-code", "301"),
    ("map-hash-bucket-size", "128"),
    ("proxy-buffer-size", "8k"),
    ("proxy-buffers", "4 8k"),
    ("enable-brotli", "true"),
    ("ssl-protocols", "TLSv1.3 TLSv1.2"),
    ("enable-ocsp", "true"),
    (
        "no-tls-redirect-locations",
        "/.well-known/acme-challenge,/verification",
    ),
];

/// Name of the ConfigMap the chart's controller watches for a release
pub fn config_map_name(release: &str) -> String {
    format!("{}-controller", release)
}

/// Build the settings data for a resolved configuration
pub fn controller_settings(spec: &ResolvedIngress) -> BTreeMap<String, String> {
    let mut data = BTreeMap::new();
    data.insert(
        "use-proxy-protocol".to_string(),
        spec.use_proxy_protocol.to_string(),
    );
    data.insert(
        "use-forwarded-headers".to_string(),
        spec.use_forwarded_headers.to_string(),
    );
    if let Some(size) = &spec.client_max_body_size {
        data.insert("client-max-body-size".to_string(), size.clone());
    }
    for (key, value) in FIXED_SETTINGS {
        data.insert((*key).to_string(), (*value).to_string());
    }

    let snippet = if spec.real_ip_from_cloudflare {
        CLOUDFLARE_REAL_IP_SNIPPET
    } else {
        ""
    };
    data.insert("server-snippet".to_string(), snippet.to_string());
    data
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::NginxIngressArgs;
    use crate::defaults::IngressDefaults;

    fn settings(args: NginxIngressArgs) -> BTreeMap<String, String> {
        controller_settings(&ResolvedIngress::resolve(
            "edge",
            &args,
            &IngressDefaults::default(),
        ))
    }

    #[test]
    fn test_fixed_values_do_not_depend_on_input() {
        let plain = settings(NginxIngressArgs::default());
        let busy = settings(NginxIngressArgs {
            service_type: Some("NodePort".to_string()),
            use_proxy_protocol: Some(true),
            client_max_body_size: Some("1g".to_string()),
            real_ip_from_cloudflare: Some(true),
            ..Default::default()
        });
        for (key, value) in FIXED_SETTINGS {
            assert_eq!(plain.get(*key).map(String::as_str), Some(*value));
            assert_eq!(busy.get(*key).map(String::as_str), Some(*value));
        }
        assert_eq!(plain["http-redirect-code"], "301");
        assert_eq!(plain["map-hash-bucket-size"], "128");
        assert_eq!(plain["proxy-buffer-size"], "8k");
        assert_eq!(plain["ssl-protocols"], "TLSv1.3 TLSv1.2");
        assert_eq!(plain["enable-ocsp"], "true");
        assert_eq!(
            plain["no-tls-redirect-locations"],
            "/.well-known/acme-challenge,/verification"
        );
    }

    #[test]
    fn test_behavior_flags_use_fallbacks() {
        let data = settings(NginxIngressArgs::default());
        assert_eq!(data["use-proxy-protocol"], "false");
        assert_eq!(data["use-forwarded-headers"], "true");
        assert!(!data.contains_key("client-max-body-size"));
    }

    #[test]
    fn test_body_size_passes_through() {
        let data = settings(NginxIngressArgs {
            client_max_body_size: Some("50m".to_string()),
            ..Default::default()
        });
        assert_eq!(data["client-max-body-size"], "50m");
    }

    #[test]
    fn test_real_ip_snippet_only_when_enabled() {
        let on = settings(NginxIngressArgs {
            real_ip_from_cloudflare: Some(true),
            ..Default::default()
        });
        assert_eq!(on["server-snippet"], "real_ip_header CF-Connecting-IP;");

        let off = settings(NginxIngressArgs {
            real_ip_from_cloudflare: Some(false),
            ..Default::default()
        });
        assert_eq!(off["server-snippet"], "");

        let absent = settings(NginxIngressArgs::default());
        assert_eq!(absent["server-snippet"], "");
    }

    #[test]
    fn test_config_map_name_follows_release() {
        assert_eq!(config_map_name("edge"), "edge-controller");
    }
}
