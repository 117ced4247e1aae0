//! LifecycleManager — ordered provisioning and teardown of a deployment.
//!
//! A deployment is three objects: the extra bundle, the main bundle and
//! the proxy resource. `deploy` and `delete` each issue exactly three store
//! calls, one after another on the caller's task. The first failure aborts
//! the sequence and is returned with the failing step; nothing already
//! done is undone, so a failed call may leave some objects behind and the
//! caller is expected to `delete` before retrying.

use std::sync::Arc;

use tracing::{debug, info, warn};

use waf_core::{
    DeletionIntent, DeploymentIntent, ManagerConfig, compose, extra_bundle_name, main_bundle_name,
};
use waf_store::{ResourceStore, StoreFuture};

use crate::error::{ManagerError, ManagerResult, Step};

/// Deploys and deletes WAF-protected proxies against a resource store.
///
/// Holds no mutable state: clones share the store handle and concurrent
/// calls are arbitrated only by the store's per-object atomicity.
#[derive(Clone)]
pub struct LifecycleManager<S = Arc<dyn ResourceStore>> {
    store: S,
    config: ManagerConfig,
}

impl<S: ResourceStore> LifecycleManager<S> {
    pub fn new(store: S, config: ManagerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Create the extra bundle, the main bundle, then the proxy resource.
    ///
    /// The proxy is created last so both bundles it mounts already exist.
    /// Not idempotent: a second deploy of the same name fails with the
    /// store's conflict on the extra bundle.
    pub async fn deploy(&self, intent: &DeploymentIntent) -> ManagerResult<()> {
        let composition = compose(intent, &self.config.image);
        info!(
            namespace = %intent.namespace,
            name = %intent.name,
            replicas = intent.replicas,
            image = %self.config.image,
            "deploying"
        );

        self.run_step(
            Step::CreateExtraBundle,
            intent,
            self.store.create_config_bundle(&composition.extra_bundle),
        )
        .await?;
        self.run_step(
            Step::CreateMainBundle,
            intent,
            self.store.create_config_bundle(&composition.main_bundle),
        )
        .await?;
        self.run_step(
            Step::CreateProxy,
            intent,
            self.store.create_proxy_resource(&composition.proxy),
        )
        .await?;

        info!(namespace = %intent.namespace, name = %intent.name, "deployed");
        Ok(())
    }

    /// Delete the extra bundle, the main bundle, then the proxy resource.
    ///
    /// Not-found is an error like any other. The bundles go before the
    /// proxy that mounts them, which is not the reverse of the creation
    /// order; this only works because the store does not check references.
    // TODO: delete the proxy first once callers no longer depend on the
    // bundles-first call sequence.
    pub async fn delete(&self, intent: &DeletionIntent) -> ManagerResult<()> {
        let extra = extra_bundle_name(&intent.name);
        let main = main_bundle_name(&intent.name);
        info!(namespace = %intent.namespace, name = %intent.name, "deleting");

        self.run_step(
            Step::DeleteExtraBundle,
            intent,
            self.store.delete_config_bundle(&intent.namespace, &extra),
        )
        .await?;
        self.run_step(
            Step::DeleteMainBundle,
            intent,
            self.store.delete_config_bundle(&intent.namespace, &main),
        )
        .await?;
        self.run_step(
            Step::DeleteProxy,
            intent,
            self.store.delete_proxy_resource(&intent.namespace, &intent.name),
        )
        .await?;

        info!(namespace = %intent.namespace, name = %intent.name, "deleted");
        Ok(())
    }

    async fn run_step(
        &self,
        step: Step,
        target: &impl StepTarget,
        call: StoreFuture<'_>,
    ) -> ManagerResult<()> {
        match call.await {
            Ok(()) => {
                debug!(namespace = target.namespace(), name = target.name(), %step, "step done");
                Ok(())
            }
            Err(source) => {
                warn!(
                    namespace = target.namespace(),
                    name = target.name(),
                    %step,
                    error = %source,
                    "step failed, aborting"
                );
                Err(ManagerError::new(step, source))
            }
        }
    }
}

/// Namespace/name pair a step runs against, for log fields.
trait StepTarget {
    fn namespace(&self) -> &str;
    fn name(&self) -> &str;
}

impl StepTarget for DeploymentIntent {
    fn namespace(&self) -> &str {
        &self.namespace
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl StepTarget for DeletionIntent {
    fn namespace(&self) -> &str {
        &self.namespace
    }
    fn name(&self) -> &str {
        &self.name
    }
}
