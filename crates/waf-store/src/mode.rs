//! Store mode selection.
//!
//! The daemon picks a mode once at startup and gets back the same
//! `ResourceStore` capability whichever backend sits behind it.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::cluster::KubeStore;
use crate::embedded::EmbeddedStore;
use crate::error::{StoreError, StoreResult};
use crate::store::ResourceStore;

/// File name of the embedded store database inside its data directory.
pub const EMBEDDED_DB_FILE: &str = "wafd.redb";

/// How to reach the resource store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreMode {
    /// Service-account credentials of the pod the daemon runs in.
    InCluster,
    /// Credentials from a kubeconfig file (`None` means the default lookup).
    OutOfCluster { kubeconfig: Option<PathBuf> },
    /// Local redb database, no cluster at all.
    Embedded { data_dir: PathBuf },
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InCluster => f.write_str("in-cluster"),
            Self::OutOfCluster { .. } => f.write_str("out-of-cluster"),
            Self::Embedded { .. } => f.write_str("embedded"),
        }
    }
}

/// Open the store selected by `mode`.
pub async fn connect(mode: &StoreMode) -> StoreResult<Arc<dyn ResourceStore>> {
    info!(%mode, "connecting resource store");
    let store: Arc<dyn ResourceStore> = match mode {
        StoreMode::InCluster => Arc::new(KubeStore::in_cluster()?),
        StoreMode::OutOfCluster { kubeconfig } => {
            Arc::new(KubeStore::out_of_cluster(kubeconfig.as_deref()).await?)
        }
        StoreMode::Embedded { data_dir } => {
            std::fs::create_dir_all(data_dir).map_err(|e| {
                StoreError::Config(format!("create data dir {}: {e}", data_dir.display()))
            })?;
            Arc::new(EmbeddedStore::open(&data_dir.join(EMBEDDED_DB_FILE))?)
        }
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waf_core::ConfigBundle;

    #[tokio::test]
    async fn connect_embedded_creates_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("nested").join("state");
        let mode = StoreMode::Embedded {
            data_dir: data_dir.clone(),
        };

        let store = connect(&mode).await.unwrap();
        store
            .create_config_bundle(&ConfigBundle::single("ns", "a-conf", "k", "v"))
            .await
            .unwrap();

        assert!(data_dir.join(EMBEDDED_DB_FILE).exists());
    }

    #[test]
    fn mode_display() {
        assert_eq!(StoreMode::InCluster.to_string(), "in-cluster");
        assert_eq!(
            StoreMode::OutOfCluster { kubeconfig: None }.to_string(),
            "out-of-cluster"
        );
    }
}
