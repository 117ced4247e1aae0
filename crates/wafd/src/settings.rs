//! Startup settings — CLI flags layered over `wafd.toml`.
//!
//! Precedence for every value: explicit flag (or its env var), then the
//! config file, then the built-in default. The image has no default.

use std::path::PathBuf;

use anyhow::bail;
use waf_core::config::StoreKind;
use waf_core::{ManagerConfig, WafConfig};
use waf_store::StoreMode;

use crate::ServeArgs;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATA_DIR: &str = "/var/lib/wafd";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub manager: ManagerConfig,
    pub store: StoreMode,
}

impl Settings {
    pub fn resolve(args: &ServeArgs, file: &WafConfig) -> anyhow::Result<Self> {
        let Some(image) = args.image.as_deref().or(file.image()) else {
            bail!("no proxy image configured: pass --image, set WAF_IMAGE or [manager] image");
        };
        if image.trim().is_empty() {
            bail!("proxy image must not be empty");
        }

        Ok(Self {
            port: args.port.or(file.port()).unwrap_or(DEFAULT_PORT),
            manager: ManagerConfig::new(image),
            store: resolve_store_mode(args, file),
        })
    }
}

fn resolve_store_mode(args: &ServeArgs, file: &WafConfig) -> StoreMode {
    let legacy = args.outside_cluster.map(|outside| {
        if outside {
            StoreKind::OutOfCluster
        } else {
            StoreKind::InCluster
        }
    });
    let kind = args
        .mode
        .map(StoreKind::from)
        .or(legacy)
        .or(file.store_kind())
        .unwrap_or(StoreKind::InCluster);

    match kind {
        StoreKind::InCluster => StoreMode::InCluster,
        StoreKind::OutOfCluster => StoreMode::OutOfCluster {
            kubeconfig: args
                .kubeconfig
                .clone()
                .or_else(|| file.kubeconfig().map(PathBuf::from)),
        },
        StoreKind::Embedded => StoreMode::Embedded {
            data_dir: args
                .data_dir
                .clone()
                .or_else(|| file.data_dir().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModeArg;
    use waf_core::config::{ManagerSection, ServerSection, StoreSection};

    fn args() -> ServeArgs {
        ServeArgs {
            config: None,
            port: None,
            image: Some("img:1".to_string()),
            mode: None,
            outside_cluster: None,
            kubeconfig: None,
            data_dir: None,
        }
    }

    #[test]
    fn defaults_to_in_cluster() {
        let settings = Settings::resolve(&args(), &WafConfig::default()).unwrap();
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.store, StoreMode::InCluster);
        assert_eq!(settings.manager.image, "img:1");
    }

    #[test]
    fn image_required() {
        let mut a = args();
        a.image = None;
        assert!(Settings::resolve(&a, &WafConfig::default()).is_err());
    }

    #[test]
    fn image_from_file() {
        let mut a = args();
        a.image = None;
        let file = WafConfig {
            manager: Some(ManagerSection {
                image: Some("file-img:2".to_string()),
            }),
            ..Default::default()
        };
        let settings = Settings::resolve(&a, &file).unwrap();
        assert_eq!(settings.manager.image, "file-img:2");
    }

    #[test]
    fn legacy_outside_cluster_flag() {
        let mut a = args();
        a.outside_cluster = Some(true);
        let settings = Settings::resolve(&a, &WafConfig::default()).unwrap();
        assert_eq!(settings.store, StoreMode::OutOfCluster { kubeconfig: None });
    }

    #[test]
    fn explicit_mode_beats_legacy_flag_and_file() {
        let mut a = args();
        a.mode = Some(ModeArg::Embedded);
        a.outside_cluster = Some(true);
        let file = WafConfig {
            server: Some(ServerSection { port: Some(9000) }),
            store: Some(StoreSection {
                mode: Some(StoreKind::InCluster),
                kubeconfig: None,
                data_dir: Some(PathBuf::from("/tmp/wafd")),
            }),
            ..Default::default()
        };
        let settings = Settings::resolve(&a, &file).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(
            settings.store,
            StoreMode::Embedded {
                data_dir: PathBuf::from("/tmp/wafd")
            }
        );
    }

    #[test]
    fn kubeconfig_from_file() {
        let file = WafConfig {
            store: Some(StoreSection {
                mode: Some(StoreKind::OutOfCluster),
                kubeconfig: Some(PathBuf::from("/etc/wafd/kubeconfig")),
                data_dir: None,
            }),
            ..Default::default()
        };
        let settings = Settings::resolve(&args(), &file).unwrap();
        assert_eq!(
            settings.store,
            StoreMode::OutOfCluster {
                kubeconfig: Some(PathBuf::from("/etc/wafd/kubeconfig"))
            }
        );
    }
}
