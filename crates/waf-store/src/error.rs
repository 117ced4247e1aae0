//! Error types for resource store clients.

use std::fmt;

use thiserror::Error;

/// Result type alias for resource store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Kind of object held by the resource store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    ConfigBundle,
    ProxyResource,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigBundle => f.write_str("configmap"),
            Self::ProxyResource => f.write_str("nginx"),
        }
    }
}

/// Errors returned by a resource store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{kind} {namespace}/{name} already exists")]
    AlreadyExists {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("{kind} {namespace}/{name} not found")]
    NotFound {
        kind: ResourceKind,
        namespace: String,
        name: String,
    },

    #[error("invalid resource: {0}")]
    Invalid(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("client configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn already_exists(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        Self::AlreadyExists {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    pub fn not_found(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        Self::NotFound {
            kind,
            namespace: namespace.to_string(),
            name: name.to_string(),
        }
    }

    /// The object already existed (create-if-absent lost).
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// The object was absent (delete-if-present lost).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Name of the object the error is about, when the store reported one.
    pub fn object_name(&self) -> Option<&str> {
        match self {
            Self::AlreadyExists { name, .. } | Self::NotFound { name, .. } => Some(name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_object() {
        let err = StoreError::already_exists(ResourceKind::ConfigBundle, "ns", "svc1-conf-extra");
        assert_eq!(err.to_string(), "configmap ns/svc1-conf-extra already exists");
        assert!(err.is_conflict());
        assert!(!err.is_not_found());
        assert_eq!(err.object_name(), Some("svc1-conf-extra"));
    }

    #[test]
    fn not_found_message() {
        let err = StoreError::not_found(ResourceKind::ProxyResource, "ns", "svc1");
        assert_eq!(err.to_string(), "nginx ns/svc1 not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_has_no_object() {
        assert_eq!(StoreError::Transport("refused".into()).object_name(), None);
    }
}
