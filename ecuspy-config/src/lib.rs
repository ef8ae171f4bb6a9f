//! ecuspy-config: schema-driven typed configuration registry.
//!
//! Public API surface:
//! - [`schema`]: entry descriptors, [`Schema`], settings manifest
//! - [`validate`]: per-type validators
//! - [`layout`]: slot offsets in the packed buffer
//! - [`store`]: [`ValueStore`] and the single-initialization [`Registry`]
//! - [`transaction`]: scoped [`Transaction`] guard
//! - [`value`]: typed reads via [`FromConfigValue`]
//! - [`config`]: [`RegistryConfig`] behaviour settings
//! - [`error`]: [`RegistryError`], [`SchemaError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod key;
pub mod layout;
pub mod schema;
pub mod store;
pub mod transaction;
pub mod validate;
pub mod value;

pub use config::{RegistryConfig, TruncationPolicy};
pub use error::{ConfigError, RegistryError, SchemaError};
pub use key::EntryKey;
pub use layout::Layout;
pub use schema::{Category, Entry, IntBounds, Manifest, Schema, ValueKind, ValueType};
pub use store::{Registry, Snapshot, ValueStore};
pub use transaction::Transaction;
pub use value::FromConfigValue;
