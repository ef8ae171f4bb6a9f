//! Error types for ecuspy-config.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while building a [`crate::schema::Schema`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A schema must describe at least one entry.
    #[error("schema has no entries")]
    Empty,

    /// Two entries share the same id.
    #[error("duplicate entry id `{id}` at index {index}")]
    DuplicateId { id: String, index: usize },

    /// An entry declares a slot that cannot hold a single byte.
    #[error("entry `{id}` declares max length 0")]
    ZeroLength { id: String },

    /// Numeric bounds are inverted or not finite.
    #[error("entry `{id}` has invalid bounds: {reason}")]
    InvalidBounds { id: String, reason: String },
}

/// All errors that can arise from value store operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The id does not resolve to any schema entry.
    #[error("no entry with id `{id}`")]
    NotFound { id: String },

    /// A positional index past the end of the schema.
    #[error("entry index {index} out of range (schema has {len} entries)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The candidate value failed its entry's type, bounds, or custom check.
    #[error("value {value:?} rejected by entry `{id}`")]
    ValidationFailed { id: String, value: String },

    /// The value does not fit the entry's slot and truncation is disabled.
    #[error("value for `{id}` is {len} bytes, entry holds at most {max_len}")]
    Truncated { id: String, len: usize, max_len: usize },

    /// The stored text could not be converted to the requested type.
    #[error("cannot read `{id}` as {target}: stored value is {value:?}")]
    Parse {
        id: String,
        value: String,
        target: &'static str,
    },

    /// `end_transaction` was called with no transaction open.
    #[error("no transaction is open")]
    NoActiveTransaction,

    /// The [`crate::store::Registry`] handle was used before `initialize`.
    #[error("registry has not been initialized")]
    NotInitialized,

    /// Schema construction failed.
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),
}

/// Errors from loading [`crate::config::RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure other than a missing file.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse registry config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// YAML parse error from an in-memory document.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
