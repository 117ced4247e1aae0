//! waf-manager — lifecycle manager for WAF-protected proxies.
//!
//! Given a deployment intent, the manager decides which objects must exist
//! (two config bundles and one `Nginx` proxy resource), creates them in
//! dependency order and tears them down again on delete.
//!
//! # Failure policy
//!
//! - The first failing store call aborts the sequence.
//! - The error names the failing step (`configmap creation failed`, ...)
//!   and carries the store error unchanged.
//! - Nothing is rolled back and nothing is retried.

pub mod error;
pub mod manager;

pub use error::{ManagerError, ManagerResult, Step};
pub use manager::LifecycleManager;
