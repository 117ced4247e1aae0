//! EmbeddedStore — redb-backed resource store.
//!
//! Gives the daemon a standalone mode that needs no cluster, and gives
//! tests a store with the same create-if-absent / delete-if-present
//! semantics as the API server. Each call is one write transaction, so
//! concurrent callers racing on one object see exactly one winner.
//!
//! Keys are `{namespace}/{name}`. Namespaces must be RFC 1123 labels and
//! names RFC 1123 subdomains, as on the API server, so neither can carry
//! a `/` and keys never collide across namespaces.

use std::path::Path;
use std::sync::Arc;

use redb::{Database, ReadableDatabase, ReadableTable};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use waf_core::{ConfigBundle, ManagedProxyResource, object_key};

use crate::error::{ResourceKind, StoreError, StoreResult};
use crate::store::{ResourceStore, StoreFuture};
use crate::tables::*;

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe resource store backed by redb.
#[derive(Clone)]
pub struct EmbeddedStore {
    db: Arc<Database>,
}

impl EmbeddedStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Database))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "embedded store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Database))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory embedded store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Database))?;
        txn.open_table(CONFIG_BUNDLES).map_err(map_err!(Database))?;
        txn.open_table(PROXY_RESOURCES).map_err(map_err!(Database))?;
        txn.commit().map_err(map_err!(Database))?;
        Ok(())
    }

    // ── Generic object operations ─────────────────────────────────

    fn insert_if_absent<T: Serialize>(
        &self,
        table_def: ObjectTable,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
        value: &T,
    ) -> StoreResult<()> {
        let key = object_key(namespace, name);
        let bytes = serde_json::to_vec(value).map_err(map_err!(Serialize))?;
        let txn = self.db.begin_write().map_err(map_err!(Database))?;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Database))?;
            let exists = table.get(key.as_str()).map_err(map_err!(Database))?.is_some();
            if exists {
                // Dropping the transaction aborts it.
                return Err(StoreError::already_exists(kind, namespace, name));
            }
            table
                .insert(key.as_str(), bytes.as_slice())
                .map_err(map_err!(Database))?;
        }
        txn.commit().map_err(map_err!(Database))?;
        debug!(%key, %kind, "object created");
        Ok(())
    }

    fn remove_if_present(
        &self,
        table_def: ObjectTable,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> StoreResult<()> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_write().map_err(map_err!(Database))?;
        let existed;
        {
            let mut table = txn.open_table(table_def).map_err(map_err!(Database))?;
            existed = table.remove(key.as_str()).map_err(map_err!(Database))?.is_some();
        }
        if !existed {
            return Err(StoreError::not_found(kind, namespace, name));
        }
        txn.commit().map_err(map_err!(Database))?;
        debug!(%key, %kind, "object deleted");
        Ok(())
    }

    fn get_object<T: DeserializeOwned>(
        &self,
        table_def: ObjectTable,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Option<T>> {
        let key = object_key(namespace, name);
        let txn = self.db.begin_read().map_err(map_err!(Database))?;
        let table = txn.open_table(table_def).map_err(map_err!(Database))?;
        match table.get(key.as_str()).map_err(map_err!(Database))? {
            Some(guard) => {
                let value = serde_json::from_slice(guard.value()).map_err(map_err!(Serialize))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn list_objects<T: DeserializeOwned>(
        &self,
        table_def: ObjectTable,
        namespace: &str,
    ) -> StoreResult<Vec<T>> {
        validate_namespace(namespace)?;
        let prefix = format!("{namespace}/");
        let txn = self.db.begin_read().map_err(map_err!(Database))?;
        let table = txn.open_table(table_def).map_err(map_err!(Database))?;
        let mut results = Vec::new();
        for entry in table.iter().map_err(map_err!(Database))? {
            let (key, value) = entry.map_err(map_err!(Database))?;
            if key.value().starts_with(&prefix) {
                let object = serde_json::from_slice(value.value()).map_err(map_err!(Serialize))?;
                results.push(object);
            }
        }
        Ok(results)
    }

    // ── Inspection ────────────────────────────────────────────────

    /// Get a config bundle by namespace and name.
    pub fn get_config_bundle(&self, namespace: &str, name: &str) -> StoreResult<Option<ConfigBundle>> {
        self.get_object(CONFIG_BUNDLES, namespace, name)
    }

    /// Get a proxy resource by namespace and name.
    pub fn get_proxy_resource(
        &self,
        namespace: &str,
        name: &str,
    ) -> StoreResult<Option<ManagedProxyResource>> {
        self.get_object(PROXY_RESOURCES, namespace, name)
    }

    /// List all config bundles in a namespace.
    pub fn list_config_bundles(&self, namespace: &str) -> StoreResult<Vec<ConfigBundle>> {
        self.list_objects(CONFIG_BUNDLES, namespace)
    }

    /// List all proxy resources in a namespace.
    pub fn list_proxy_resources(&self, namespace: &str) -> StoreResult<Vec<ManagedProxyResource>> {
        self.list_objects(PROXY_RESOURCES, namespace)
    }
}

/// RFC 1123 label: lowercase alphanumerics and `-`, at most 63 bytes.
fn is_dns_label(s: &str) -> bool {
    !s.is_empty()
        && s.len() <= 63
        && s.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        && !s.starts_with('-')
        && !s.ends_with('-')
}

/// RFC 1123 subdomain: dot-separated labels, at most 253 bytes.
fn is_dns_subdomain(s: &str) -> bool {
    s.len() <= 253 && s.split('.').all(is_dns_label)
}

fn validate_namespace(namespace: &str) -> StoreResult<()> {
    if namespace.is_empty() {
        return Err(StoreError::Invalid("metadata.namespace: required value".to_string()));
    }
    if !is_dns_label(namespace) {
        return Err(StoreError::Invalid(format!(
            "metadata.namespace: invalid value {namespace:?}: must be a lowercase RFC 1123 label"
        )));
    }
    Ok(())
}

/// Metadata checks the API server applies to every object.
fn validate_object(namespace: &str, name: &str) -> StoreResult<()> {
    if name.is_empty() {
        return Err(StoreError::Invalid("metadata.name: required value".to_string()));
    }
    if !is_dns_subdomain(name) {
        return Err(StoreError::Invalid(format!(
            "metadata.name: invalid value {name:?}: must be a lowercase RFC 1123 subdomain"
        )));
    }
    validate_namespace(namespace)
}

/// Admission checks the API server would apply to an `Nginx` object.
fn validate_proxy(proxy: &ManagedProxyResource) -> StoreResult<()> {
    validate_object(&proxy.namespace, &proxy.name)?;
    if proxy.replicas < 0 {
        return Err(StoreError::Invalid(format!(
            "spec.replicas: {} must be greater than or equal to 0",
            proxy.replicas
        )));
    }
    if !proxy.referenced_bundles().iter().all(|name| is_dns_subdomain(name)) {
        return Err(StoreError::Invalid("spec: config references must be valid names".to_string()));
    }
    Ok(())
}

impl ResourceStore for EmbeddedStore {
    fn create_config_bundle<'a>(&'a self, bundle: &'a ConfigBundle) -> StoreFuture<'a> {
        Box::pin(async move {
            validate_object(&bundle.namespace, &bundle.name)?;
            self.insert_if_absent(
                CONFIG_BUNDLES,
                ResourceKind::ConfigBundle,
                &bundle.namespace,
                &bundle.name,
                bundle,
            )
        })
    }

    fn delete_config_bundle<'a>(&'a self, namespace: &'a str, name: &'a str) -> StoreFuture<'a> {
        Box::pin(async move {
            validate_object(namespace, name)?;
            self.remove_if_present(CONFIG_BUNDLES, ResourceKind::ConfigBundle, namespace, name)
        })
    }

    fn create_proxy_resource<'a>(&'a self, proxy: &'a ManagedProxyResource) -> StoreFuture<'a> {
        Box::pin(async move {
            validate_proxy(proxy)?;
            self.insert_if_absent(
                PROXY_RESOURCES,
                ResourceKind::ProxyResource,
                &proxy.namespace,
                &proxy.name,
                proxy,
            )
        })
    }

    fn delete_proxy_resource<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a> {
        Box::pin(async move {
            validate_object(namespace, name)?;
            self.remove_if_present(PROXY_RESOURCES, ResourceKind::ProxyResource, namespace, name)
        })
    }
}
