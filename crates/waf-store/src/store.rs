//! The resource store capability consumed by the lifecycle manager.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use waf_core::{ConfigBundle, ManagedProxyResource};

use crate::error::StoreResult;

/// Boxed future returned by every store call.
pub type StoreFuture<'a> = Pin<Box<dyn Future<Output = StoreResult<()>> + Send + 'a>>;

/// Namespace-scoped create/delete of config bundles and proxy resources.
///
/// A call resolves once the store has accepted the request, not once the
/// object is reconciled. Creates are create-if-absent and deletes are
/// delete-if-present; neither cascades nor checks references between
/// objects. Dropping the future cancels the call.
pub trait ResourceStore: Send + Sync {
    /// Fails with `AlreadyExists` if the bundle name is taken in its namespace.
    fn create_config_bundle<'a>(&'a self, bundle: &'a ConfigBundle) -> StoreFuture<'a>;

    /// Fails with `NotFound` if no such bundle exists.
    fn delete_config_bundle<'a>(&'a self, namespace: &'a str, name: &'a str) -> StoreFuture<'a>;

    /// Fails with `AlreadyExists` on a name collision or `Invalid` when the
    /// store's own validation rejects the spec.
    fn create_proxy_resource<'a>(&'a self, proxy: &'a ManagedProxyResource) -> StoreFuture<'a>;

    /// Fails with `NotFound` if no such resource exists.
    fn delete_proxy_resource<'a>(&'a self, namespace: &'a str, name: &'a str)
    -> StoreFuture<'a>;
}

impl<S: ResourceStore + ?Sized> ResourceStore for Arc<S> {
    fn create_config_bundle<'a>(&'a self, bundle: &'a ConfigBundle) -> StoreFuture<'a> {
        (**self).create_config_bundle(bundle)
    }

    fn delete_config_bundle<'a>(&'a self, namespace: &'a str, name: &'a str) -> StoreFuture<'a> {
        (**self).delete_config_bundle(namespace, name)
    }

    fn create_proxy_resource<'a>(&'a self, proxy: &'a ManagedProxyResource) -> StoreFuture<'a> {
        (**self).create_proxy_resource(proxy)
    }

    fn delete_proxy_resource<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> StoreFuture<'a> {
        (**self).delete_proxy_resource(namespace, name)
    }
}
