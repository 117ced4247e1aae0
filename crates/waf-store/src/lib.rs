//! waf-store — resource store clients for the WAF manager.
//!
//! The lifecycle manager only sees the [`ResourceStore`] trait. Two
//! backends implement it:
//!
//! - [`KubeStore`] talks to a Kubernetes API server (ConfigMaps plus the
//!   nginx-operator `Nginx` custom resource), with in-cluster or
//!   kubeconfig credentials.
//! - [`EmbeddedStore`] keeps objects in a local [redb](https://docs.rs/redb)
//!   database, for standalone runs and tests.
//!
//! [`connect`] turns an explicit [`StoreMode`] into a shared store handle.

pub mod cluster;
pub mod embedded;
pub mod error;
pub mod mode;
pub mod store;
pub mod tables;

pub use cluster::KubeStore;
pub use embedded::EmbeddedStore;
pub use error::{ResourceKind, StoreError, StoreResult};
pub use mode::{StoreMode, connect};
pub use store::{ResourceStore, StoreFuture};
