//! KubeStore — resource store backed by a Kubernetes API server.
//!
//! Config bundles become core/v1 ConfigMaps. The managed proxy becomes an
//! nginx-operator `Nginx` custom resource, built as a `DynamicObject` since
//! the CRD schema is owned by the operator, not this workspace.

use std::path::Path;

use k8s_openapi::api::core::v1::ConfigMap;
use kube::api::{Api, DeleteParams, DynamicObject, ObjectMeta, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::{Client, Config};
use serde_json::json;
use tracing::{debug, info};

use waf_core::{ConfigBundle, ManagedProxyResource, PROXY_API_VERSION, PROXY_KIND, PROXY_PLURAL};

use crate::error::{ResourceKind, StoreError, StoreResult};
use crate::store::{ResourceStore, StoreFuture};

/// Resource store talking to a live cluster.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
    proxy_resource: ApiResource,
}

impl KubeStore {
    /// Wrap an already-configured client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            proxy_resource: proxy_api_resource(),
        }
    }

    /// Build a client from the pod's service account.
    pub fn in_cluster() -> StoreResult<Self> {
        let config = Config::incluster()
            .map_err(|e| StoreError::Config(format!("in-cluster config: {e}")))?;
        let client = Client::try_from(config)
            .map_err(|e| StoreError::Config(format!("failed to create client: {e}")))?;
        info!("kube client created from in-cluster service account");
        Ok(Self::new(client))
    }

    /// Build a client from a kubeconfig file.
    ///
    /// With no path, `$KUBECONFIG` or `~/.kube/config` is used.
    pub async fn out_of_cluster(kubeconfig: Option<&Path>) -> StoreResult<Self> {
        let kubeconfig = match kubeconfig {
            Some(path) => Kubeconfig::read_from(path),
            None => Kubeconfig::read(),
        }
        .map_err(|e| StoreError::Config(format!("failed to read kubeconfig: {e}")))?;
        let config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
            .await
            .map_err(|e| StoreError::Config(format!("failed to load kubeconfig: {e}")))?;
        let client = Client::try_from(config)
            .map_err(|e| StoreError::Config(format!("failed to create client: {e}")))?;
        info!("kube client created from kubeconfig");
        Ok(Self::new(client))
    }

    fn config_maps(&self, namespace: &str) -> Api<ConfigMap> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn proxies(&self, namespace: &str) -> Api<DynamicObject> {
        Api::namespaced_with(self.client.clone(), namespace, &self.proxy_resource)
    }
}

/// `ApiResource` for `nginx.tsuru.io/v1alpha1` `Nginx`.
pub fn proxy_api_resource() -> ApiResource {
    let (group, version) = PROXY_API_VERSION
        .split_once('/')
        .unwrap_or(("", PROXY_API_VERSION));
    let gvk = GroupVersionKind::gvk(group, version, PROXY_KIND);
    ApiResource::from_gvk_with_plural(&gvk, PROXY_PLURAL)
}

/// Wire form of a config bundle.
pub fn config_map_for(bundle: &ConfigBundle) -> ConfigMap {
    ConfigMap {
        metadata: ObjectMeta {
            name: Some(bundle.name.clone()),
            namespace: Some(bundle.namespace.clone()),
            ..Default::default()
        },
        data: Some(bundle.data.clone()),
        immutable: Some(false),
        ..Default::default()
    }
}

/// Wire form of a managed proxy resource.
pub fn dynamic_object_for(proxy: &ManagedProxyResource, resource: &ApiResource) -> DynamicObject {
    DynamicObject::new(&proxy.name, resource)
        .within(&proxy.namespace)
        .data(json!({
            "spec": {
                "replicas": proxy.replicas,
                "image": proxy.image,
                "config": {
                    "kind": proxy.config.kind,
                    "name": proxy.config.name,
                },
                "service": {
                    "type": proxy.service.service_type,
                },
                "extraFiles": {
                    "name": proxy.extra_files.name,
                    "files": proxy.extra_files.files,
                },
            }
        }))
}

/// Map a kube API error onto the store's taxonomy.
fn map_kube_error(err: kube::Error, kind: ResourceKind, namespace: &str, name: &str) -> StoreError {
    match err {
        kube::Error::Api(ae) if ae.code == 409 => StoreError::already_exists(kind, namespace, name),
        kube::Error::Api(ae) if ae.code == 404 => StoreError::not_found(kind, namespace, name),
        kube::Error::Api(ae) if ae.code == 400 || ae.code == 422 => {
            StoreError::Invalid(format!("{kind} {namespace}/{name}: {}", ae.message))
        }
        other => StoreError::Transport(format!("{kind} {namespace}/{name}: {other}")),
    }
}

impl ResourceStore for KubeStore {
    fn create_config_bundle<'a>(&'a self, bundle: &'a ConfigBundle) -> StoreFuture<'a> {
        Box::pin(async move {
            let cm = config_map_for(bundle);
            self.config_maps(&bundle.namespace)
                .create(&PostParams::default(), &cm)
                .await
                .map_err(|e| {
                    map_kube_error(e, ResourceKind::ConfigBundle, &bundle.namespace, &bundle.name)
                })?;
            debug!(namespace = %bundle.namespace, name = %bundle.name, "configmap created");
            Ok(())
        })
    }

    fn delete_config_bundle<'a>(&'a self, namespace: &'a str, name: &'a str) -> StoreFuture<'a> {
        Box::pin(async move {
            self.config_maps(namespace)
                .delete(name, &DeleteParams::default())
                .await
                .map_err(|e| map_kube_error(e, ResourceKind::ConfigBundle, namespace, name))?;
            debug!(%namespace, %name, "configmap deleted");
            Ok(())
        })
    }

    fn create_proxy_resource<'a>(&'a self, proxy: &'a ManagedProxyResource) -> StoreFuture<'a> {
        Box::pin(async move {
            let obj = dynamic_object_for(proxy, &self.proxy_resource);
            self.proxies(&proxy.namespace)
                .create(&PostParams::default(), &obj)
                .await
                .map_err(|e| {
                    map_kube_error(e, ResourceKind::ProxyResource, &proxy.namespace, &proxy.name)
                })?;
            debug!(namespace = %proxy.namespace, name = %proxy.name, "nginx resource created");
            Ok(())
        })
    }

    fn delete_proxy_resource<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a> {
        Box::pin(async move {
            self.proxies(namespace)
                .delete(name, &DeleteParams::default())
                .await
                .map_err(|e| map_kube_error(e, ResourceKind::ProxyResource, namespace, name))?;
            debug!(%namespace, %name, "nginx resource deleted");
            Ok(())
        })
    }
}
