//! Caller intents handed from the gateway to the lifecycle manager.

use serde::{Deserialize, Serialize};

fn default_namespace() -> String {
    "default".to_string()
}

/// Desired deployment of a protected web service.
///
/// `replicas` is signed on purpose: the manager forwards it unchecked and
/// the resource store is the one that rejects negative counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentIntent {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default)]
    pub replicas: i32,
    /// Where `location /` forwards to. Empty renders an empty `proxy_pass`.
    #[serde(default, rename = "proxy", alias = "upstreamTarget")]
    pub upstream_target: String,
}

/// Removal of a previously deployed service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionIntent {
    pub name: String,
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

impl DeploymentIntent {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
        replicas: i32,
        upstream_target: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            replicas,
            upstream_target: upstream_target.into(),
        }
    }
}

impl DeletionIntent {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
        }
    }
}

impl From<&DeploymentIntent> for DeletionIntent {
    fn from(intent: &DeploymentIntent) -> Self {
        Self::new(&intent.name, &intent.namespace)
    }
}
