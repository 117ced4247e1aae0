//! wafd.toml configuration parser.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Settings the lifecycle manager is constructed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Container image for every managed proxy.
    pub image: String,
}

impl ManagerConfig {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WafConfig {
    pub manager: Option<ManagerSection>,
    pub server: Option<ServerSection>,
    pub store: Option<StoreSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManagerSection {
    pub image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSection {
    pub mode: Option<StoreKind>,
    pub kubeconfig: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
}

/// Which resource store backend the daemon talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreKind {
    InCluster,
    OutOfCluster,
    Embedded,
}

impl WafConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn image(&self) -> Option<&str> {
        self.manager.as_ref()?.image.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.server.as_ref()?.port
    }

    pub fn store_kind(&self) -> Option<StoreKind> {
        self.store.as_ref()?.mode
    }

    pub fn kubeconfig(&self) -> Option<&Path> {
        self.store.as_ref()?.kubeconfig.as_deref()
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.store.as_ref()?.data_dir.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let toml_str = r#"
[manager]
image = "tsuru/nginx-modsecurity:1.0"

[server]
port = 8000

[store]
mode = "out-of-cluster"
kubeconfig = "/home/me/.kube/config"
"#;
        let config: WafConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.image(), Some("tsuru/nginx-modsecurity:1.0"));
        assert_eq!(config.port(), Some(8000));
        assert_eq!(config.store_kind(), Some(StoreKind::OutOfCluster));
        assert_eq!(config.kubeconfig(), Some(Path::new("/home/me/.kube/config")));
        assert!(config.data_dir().is_none());
    }

    #[test]
    fn test_parse_empty() {
        let config: WafConfig = toml::from_str("").unwrap();
        assert!(config.image().is_none());
        assert!(config.store_kind().is_none());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let result: Result<WafConfig, _> = toml::from_str("[store]\nmode = \"sideways\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wafd.toml");
        let config = WafConfig {
            manager: Some(ManagerSection {
                image: Some("img:2".to_string()),
            }),
            server: None,
            store: Some(StoreSection {
                mode: Some(StoreKind::Embedded),
                kubeconfig: None,
                data_dir: Some(PathBuf::from("/var/lib/wafd")),
            }),
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();

        let loaded = WafConfig::from_file(&path).unwrap();
        assert_eq!(loaded.image(), Some("img:2"));
        assert_eq!(loaded.store_kind(), Some(StoreKind::Embedded));
        assert_eq!(loaded.data_dir(), Some(Path::new("/var/lib/wafd")));
    }

    #[test]
    fn test_missing_file() {
        let err = WafConfig::from_file(Path::new("/nonexistent/wafd.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
