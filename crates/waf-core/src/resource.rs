//! Typed resource model.
//!
//! These are the objects a deployment materializes in the resource store:
//! two config bundles (ConfigMaps) and one managed proxy resource (an
//! nginx-operator `Nginx` object). They stay strongly typed here; the
//! untyped wire shape is produced only by the store client.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// API group/version of the managed proxy custom resource.
pub const PROXY_API_VERSION: &str = "nginx.tsuru.io/v1alpha1";

/// Kind of the managed proxy custom resource.
pub const PROXY_KIND: &str = "Nginx";

/// Plural resource name the API server serves the proxy kind under.
pub const PROXY_PLURAL: &str = "nginxes";

/// Directory the operator mounts `extraFiles` into.
pub const EXTRA_FILES_MOUNT: &str = "/etc/nginx/extra_files";

// ── Config bundle ─────────────────────────────────────────────────

/// Named, namespaced key → text mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBundle {
    pub namespace: String,
    pub name: String,
    pub data: BTreeMap<String, String>,
}

impl ConfigBundle {
    /// Bundle holding a single file.
    pub fn single(
        namespace: impl Into<String>,
        name: impl Into<String>,
        key: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            data: BTreeMap::from([(key.into(), content.into())]),
        }
    }

    /// Composite key `{namespace}/{name}`.
    pub fn table_key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }
}

// ── Managed proxy resource ────────────────────────────────────────

/// The logical deployment: an nginx proxy fronted by ModSecurity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagedProxyResource {
    pub namespace: String,
    pub name: String,
    pub replicas: i32,
    pub image: String,
    /// Bundle holding `nginx.conf`.
    pub config: ConfigRef,
    pub service: ServiceSpec,
    /// Bundle mounted as auxiliary files under [`EXTRA_FILES_MOUNT`].
    pub extra_files: FilesRef,
}

/// Reference to the object carrying the main nginx configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRef {
    pub kind: ConfigKind,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigKind {
    ConfigMap,
}

/// Service exposure for the proxy pods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceSpec {
    #[serde(rename = "type")]
    pub service_type: ServiceType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    NodePort,
}

/// Files projected from a bundle: bundle key → file name under the mount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesRef {
    pub name: String,
    pub files: BTreeMap<String, String>,
}

impl ManagedProxyResource {
    /// Composite key `{namespace}/{name}`.
    pub fn table_key(&self) -> String {
        object_key(&self.namespace, &self.name)
    }

    /// Names of the bundles this resource mounts, main first.
    pub fn referenced_bundles(&self) -> [&str; 2] {
        [self.config.name.as_str(), self.extra_files.name.as_str()]
    }
}

/// Build the `{namespace}/{name}` key used by the embedded store.
pub fn object_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}
