//! redb table definitions for the embedded store.
//!
//! Both tables use `{namespace}/{name}` keys and JSON-serialized values.

use redb::TableDefinition;

/// Shape shared by every object table.
pub type ObjectTable = TableDefinition<'static, &'static str, &'static [u8]>;

/// Config bundles keyed by `{namespace}/{name}`.
pub const CONFIG_BUNDLES: ObjectTable = TableDefinition::new("config_bundles");

/// Managed proxy resources keyed by `{namespace}/{name}`.
pub const PROXY_RESOURCES: ObjectTable = TableDefinition::new("proxy_resources");
