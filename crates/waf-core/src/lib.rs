//! waf-core — core types for the WAF deployment manager.
//!
//! Holds everything that is pure: the caller intents, the typed resource
//! model (config bundles and the managed `Nginx` proxy resource), the
//! naming/composition policy that derives resources from an intent, and
//! the `wafd.toml` configuration file.

pub mod compose;
pub mod config;
pub mod intent;
pub mod resource;

pub use compose::{Composition, compose, extra_bundle_name, main_bundle_name};
pub use config::{ConfigError, ManagerConfig, StoreKind, WafConfig};
pub use intent::{DeletionIntent, DeploymentIntent};
pub use resource::*;
