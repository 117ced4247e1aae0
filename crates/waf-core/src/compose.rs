//! Naming and composition policy.
//!
//! Every function here is a pure function of its inputs: the same intent
//! always yields byte-identical bundles and the same proxy resource.

use std::collections::BTreeMap;

use crate::intent::DeploymentIntent;
use crate::resource::*;

/// Key of the ModSecurity include list inside the extra bundle.
pub const MODSEC_INCLUDES_KEY: &str = "modsec-includes.conf";

/// Key of the nginx configuration inside the main bundle.
pub const NGINX_CONF_KEY: &str = "nginx.conf";

/// Port the proxy server block listens on.
pub const LISTEN_PORT: u16 = 8080;

/// Path answered unconditionally with a 200 for health probes.
pub const HEALTH_PATH: &str = "/nginx-health";

/// Pinned ModSecurity + CRS include list, identical for every deployment.
pub const MODSEC_INCLUDES: &str = "\
Include /usr/local/waf-conf/modsecurity-recommended.conf
Include /usr/local/waf-conf/crs-setup.conf
Include /usr/local/waf-conf/rules/*.conf
";

/// Name of the bundle holding `nginx.conf`.
pub fn main_bundle_name(name: &str) -> String {
    format!("{name}-conf")
}

/// Name of the bundle holding the ModSecurity includes.
pub fn extra_bundle_name(name: &str) -> String {
    format!("{name}-conf-extra")
}

/// Render `nginx.conf` for an upstream target.
///
/// The upstream is inserted exactly once and copied verbatim.
pub fn render_nginx_conf(upstream_target: &str) -> String {
    format!(
        r#"load_module modules/ngx_http_modsecurity_module.so;
events {{}}

http {{
    server {{
        listen {LISTEN_PORT};

        modsecurity on;
        modsecurity_rules_file {EXTRA_FILES_MOUNT}/{MODSEC_INCLUDES_KEY};

        location / {{
            proxy_pass {upstream_target};
        }}

        location {HEALTH_PATH} {{
            access_log off;
            return 200 "healthy\n";
        }}
    }}
}}
"#
    )
}

/// The static include bundle for an intent.
pub fn compose_extra_bundle(intent: &DeploymentIntent) -> ConfigBundle {
    ConfigBundle::single(
        &intent.namespace,
        extra_bundle_name(&intent.name),
        MODSEC_INCLUDES_KEY,
        MODSEC_INCLUDES,
    )
}

/// The templated nginx configuration bundle for an intent.
pub fn compose_main_bundle(intent: &DeploymentIntent) -> ConfigBundle {
    ConfigBundle::single(
        &intent.namespace,
        main_bundle_name(&intent.name),
        NGINX_CONF_KEY,
        render_nginx_conf(&intent.upstream_target),
    )
}

/// The proxy resource referencing both bundles.
pub fn compose_proxy_resource(intent: &DeploymentIntent, image: &str) -> ManagedProxyResource {
    ManagedProxyResource {
        namespace: intent.namespace.clone(),
        name: intent.name.clone(),
        replicas: intent.replicas,
        image: image.to_string(),
        config: ConfigRef {
            kind: ConfigKind::ConfigMap,
            name: main_bundle_name(&intent.name),
        },
        service: ServiceSpec {
            service_type: ServiceType::NodePort,
        },
        extra_files: FilesRef {
            name: extra_bundle_name(&intent.name),
            files: BTreeMap::from([(
                MODSEC_INCLUDES_KEY.to_string(),
                MODSEC_INCLUDES_KEY.to_string(),
            )]),
        },
    }
}

/// All objects a deployment consists of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composition {
    pub extra_bundle: ConfigBundle,
    pub main_bundle: ConfigBundle,
    pub proxy: ManagedProxyResource,
}

impl Composition {
    /// Object names in creation order.
    pub fn resource_names(&self) -> [&str; 3] {
        [
            self.extra_bundle.name.as_str(),
            self.main_bundle.name.as_str(),
            self.proxy.name.as_str(),
        ]
    }
}

/// Compose every object for an intent.
pub fn compose(intent: &DeploymentIntent, image: &str) -> Composition {
    Composition {
        extra_bundle: compose_extra_bundle(intent),
        main_bundle: compose_main_bundle(intent),
        proxy: compose_proxy_resource(intent, image),
    }
}
