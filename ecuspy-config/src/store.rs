//! The value store: packed committed/shadow buffers and transaction state.
//!
//! # Buffers
//!
//! ```text
//! committed  | id1 ......\0 | id2 ...............\0 | ...
//! shadow     | same layout, working copy while depth > 0
//! ```
//!
//! While no transaction is open (`depth == 0`) writes go straight to
//! `committed` and `shadow` is stale. `begin_transaction` at depth 0 copies
//! `committed` into `shadow`; from then on writes land in `shadow` until the
//! outermost transaction ends and `shadow` is copied back.
//!
//! Nesting is a plain counter. Only the 1 -> 0 transition commits, and an
//! abort at any depth drops the whole stack: there are no per-level
//! checkpoints.
//!
//! # Locking
//!
//! All buffer state sits behind one `parking_lot::RwLock`. Writes and
//! transaction transitions take the write side and are fully serialized.
//! Reads take the read side, so a reader never sees a half-written slot.
//! Transactions are not tied to a thread; any thread may end or abort a
//! transaction another thread began.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use serde::Serialize;

use crate::config::{RegistryConfig, TruncationPolicy};
use crate::error::RegistryError;
use crate::key::EntryKey;
use crate::layout::Layout;
use crate::schema::{Entry, Schema};
use crate::transaction::Transaction;
use crate::validate;
use crate::value::FromConfigValue;

#[derive(Debug)]
struct Buffers {
    committed: Vec<u8>,
    shadow: Vec<u8>,
    depth: usize,
}

impl Buffers {
    fn working(&self) -> &[u8] {
        if self.depth > 0 {
            &self.shadow
        } else {
            &self.committed
        }
    }
}

/// Committed values keyed by entry id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<String, String>);

/// Schema-bound store of textual values with nested transactions.
#[derive(Debug)]
pub struct ValueStore {
    schema: Arc<Schema>,
    layout: Layout,
    config: RegistryConfig,
    state: RwLock<Buffers>,
}

impl ValueStore {
    pub fn new(schema: impl Into<Arc<Schema>>) -> Self {
        Self::with_config(schema, RegistryConfig::default())
    }

    /// Build the layout and allocate both buffers, zeroed.
    pub fn with_config(schema: impl Into<Arc<Schema>>, config: RegistryConfig) -> Self {
        let schema = schema.into();
        let layout = Layout::new(&schema);
        let size = layout.size();
        tracing::info!(
            entries = schema.len(),
            bytes = size,
            truncation = ?config.truncation,
            "value store initialized"
        );
        Self {
            schema,
            layout,
            config,
            state: RwLock::new(Buffers {
                committed: vec![0; size],
                shadow: vec![0; size],
                depth: 0,
            }),
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Number of currently open transactions.
    pub fn depth(&self) -> usize {
        self.state.read().depth
    }

    pub fn index_by_id(&self, id: &str) -> Result<usize, RegistryError> {
        id.resolve(&self.schema)
    }

    pub fn entry(&self, key: impl EntryKey) -> Result<&Entry, RegistryError> {
        let index = key.resolve(&self.schema)?;
        Ok(&self.schema.entries()[index])
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Committed value of an entry, up to its terminator.
    pub fn get_value(&self, key: impl EntryKey) -> Result<String, RegistryError> {
        let index = key.resolve(&self.schema)?;
        let state = self.state.read();
        Ok(self.read_slot(&state.committed, index))
    }

    /// Committed value of an entry converted to `T`.
    pub fn get<T: FromConfigValue>(&self, key: impl EntryKey) -> Result<T, RegistryError> {
        let index = key.resolve(&self.schema)?;
        let raw = self.get_value(index)?;
        self.convert(index, raw)
    }

    /// Value as seen by an open transaction: shadow while `depth > 0`.
    pub(crate) fn working_value(&self, key: impl EntryKey) -> Result<String, RegistryError> {
        let index = key.resolve(&self.schema)?;
        let state = self.state.read();
        Ok(self.read_slot(state.working(), index))
    }

    pub(crate) fn working_get<T: FromConfigValue>(
        &self,
        key: impl EntryKey,
    ) -> Result<T, RegistryError> {
        let index = key.resolve(&self.schema)?;
        let raw = self.working_value(index)?;
        self.convert(index, raw)
    }

    /// Committed values of every entry, read under one lock.
    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.read();
        Snapshot(
            self.schema
                .entries()
                .iter()
                .enumerate()
                .map(|(index, e)| (e.id.clone(), self.read_slot(&state.committed, index)))
                .collect(),
        )
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Check `candidate` against the entry without storing it.
    pub fn validate(&self, key: impl EntryKey, candidate: &str) -> Result<bool, RegistryError> {
        let entry = self.entry(key)?;
        Ok(validate::validate(entry, candidate))
    }

    /// Store `value` in the entry's slot: the shadow buffer if a transaction
    /// is open, otherwise the committed buffer.
    ///
    /// No validation happens unless `validate_on_set` is configured; callers
    /// are expected to [`validate`](Self::validate) first or use
    /// [`set_validated`](Self::set_validated). The value is cut at its first
    /// NUL byte. Values longer than the slot are truncated (on a character
    /// boundary) or rejected, per [`TruncationPolicy`].
    pub fn set_value(&self, key: impl EntryKey, value: &str) -> Result<(), RegistryError> {
        let index = key.resolve(&self.schema)?;
        self.write_slot(index, value, self.config.validate_on_set)
    }

    /// Validate, then store. Nothing is written if validation fails.
    pub fn set_validated(&self, key: impl EntryKey, value: &str) -> Result<(), RegistryError> {
        let index = key.resolve(&self.schema)?;
        self.write_slot(index, value, true)
    }

    // The check runs on the exact text that will be stored: cut at the first
    // NUL and fitted to the slot.
    fn write_slot(&self, index: usize, value: &str, check: bool) -> Result<(), RegistryError> {
        let entry = &self.schema.entries()[index];
        let value = value.find('\0').map_or(value, |nul| &value[..nul]);
        let fitted = self.fit_to_slot(entry, value)?;

        if check && !validate::validate(entry, fitted) {
            return Err(RegistryError::ValidationFailed {
                id: entry.id.clone(),
                value: fitted.to_owned(),
            });
        }

        let slot = self.layout.slot(index);
        let mut state = self.state.write();
        let target = if state.depth > 0 {
            &mut state.shadow[slot]
        } else {
            &mut state.committed[slot]
        };
        target.fill(0);
        target[..fitted.len()].copy_from_slice(fitted.as_bytes());
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transactions
    // -----------------------------------------------------------------------

    /// Open a transaction. The outermost one snapshots committed into shadow.
    ///
    /// Prefer [`transaction`](Self::transaction), which pairs this with an
    /// end or abort.
    pub fn begin_transaction(&self) {
        let mut state = self.state.write();
        if state.depth == 0 {
            let Buffers {
                committed, shadow, ..
            } = &mut *state;
            shadow.copy_from_slice(committed);
        }
        state.depth += 1;
        tracing::debug!(depth = state.depth, "transaction begin");
    }

    /// Close one transaction. Closing the outermost copies shadow into
    /// committed; closing an inner one only decrements the depth.
    pub fn end_transaction(&self) -> Result<(), RegistryError> {
        let mut state = self.state.write();
        let depth = state.depth;
        match depth {
            0 => Err(RegistryError::NoActiveTransaction),
            1 => {
                let Buffers {
                    committed, shadow, ..
                } = &mut *state;
                committed.copy_from_slice(shadow);
                state.depth = 0;
                tracing::debug!("transaction committed");
                Ok(())
            }
            _ => {
                state.depth -= 1;
                tracing::debug!(depth = state.depth, "inner transaction closed");
                Ok(())
            }
        }
    }

    /// Drop every open transaction and its shadow writes.
    pub fn abort_transaction(&self) {
        let mut state = self.state.write();
        if state.depth > 0 {
            tracing::warn!(depth = state.depth, "transaction aborted");
        }
        state.depth = 0;
    }

    /// Begin a transaction and return a guard that ends or aborts it.
    pub fn transaction(&self) -> Transaction<'_> {
        Transaction::begin(self)
    }

    /// Run `f` inside a transaction: commit on `Ok`, abort on `Err`.
    pub fn with_transaction<T, E, F>(&self, f: F) -> Result<T, E>
    where
        E: From<RegistryError>,
        F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    {
        let tx = self.transaction();
        match f(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                tx.rollback();
                Err(err)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn read_slot(&self, buf: &[u8], index: usize) -> String {
        let slot = &buf[self.layout.slot(index)];
        let end = slot.iter().position(|&b| b == 0).unwrap_or(slot.len());
        String::from_utf8_lossy(&slot[..end]).into_owned()
    }

    fn convert<T: FromConfigValue>(&self, index: usize, raw: String) -> Result<T, RegistryError> {
        T::from_config_value(&raw).ok_or_else(|| RegistryError::Parse {
            id: self.schema.entries()[index].id.clone(),
            value: raw,
            target: T::TYPE_NAME,
        })
    }

    fn fit_to_slot<'v>(&self, entry: &Entry, value: &'v str) -> Result<&'v str, RegistryError> {
        if value.len() <= entry.max_len {
            return Ok(value);
        }
        match self.config.truncation {
            TruncationPolicy::Reject => Err(RegistryError::Truncated {
                id: entry.id.clone(),
                len: value.len(),
                max_len: entry.max_len,
            }),
            TruncationPolicy::Silent => {
                let mut cut = entry.max_len;
                while !value.is_char_boundary(cut) {
                    cut -= 1;
                }
                tracing::warn!(
                    id = %entry.id,
                    len = value.len(),
                    max_len = entry.max_len,
                    "value truncated"
                );
                Ok(&value[..cut])
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Single-initialization handle
// ---------------------------------------------------------------------------

/// Holder for the process's one store.
///
/// The first [`initialize`](Self::initialize) binds the schema; later calls
/// return the same store and ignore their arguments. Can live in a `static`.
#[derive(Debug, Default)]
pub struct Registry {
    store: OnceLock<ValueStore>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            store: OnceLock::new(),
        }
    }

    pub fn initialize(&self, schema: impl Into<Arc<Schema>>) -> &ValueStore {
        self.initialize_with(schema, RegistryConfig::default())
    }

    pub fn initialize_with(
        &self,
        schema: impl Into<Arc<Schema>>,
        config: RegistryConfig,
    ) -> &ValueStore {
        let mut created = false;
        let store = self.store.get_or_init(|| {
            created = true;
            ValueStore::with_config(schema, config)
        });
        if !created {
            tracing::debug!("registry already initialized; ignoring new schema");
        }
        store
    }

    pub fn is_initialized(&self) -> bool {
        self.store.get().is_some()
    }

    pub fn store(&self) -> Result<&ValueStore, RegistryError> {
        self.store.get().ok_or(RegistryError::NotInitialized)
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Category, ValueKind};

    fn store() -> ValueStore {
        let schema = Schema::new(vec![
            Entry::new("id1", "name1", Category::Wifi, ValueKind::String, 10),
            Entry::new("id2", "name2Str", Category::Wifi, ValueKind::String, 4),
        ])
        .expect("schema");
        ValueStore::new(schema)
    }

    #[test]
    fn fresh_store_reads_empty() {
        let s = store();
        assert_eq!(s.get_value(0).unwrap(), "");
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn shorter_write_clears_old_tail() {
        let s = store();
        s.set_value(0, "abcdefgh").unwrap();
        s.set_value(0, "xy").unwrap();
        assert_eq!(s.get_value(0).unwrap(), "xy");
    }

    #[test]
    fn overlong_write_stays_in_its_slot() {
        let s = store();
        s.set_value(0, "0123456789ABCDEF").unwrap();
        assert_eq!(s.get_value(0).unwrap(), "0123456789");
        assert_eq!(s.get_value(1).unwrap(), "");
    }

    #[test]
    fn truncation_respects_char_boundary() {
        let s = store();
        // "aéé" is 5 bytes; the cut at 4 would split the second 'é'.
        s.set_value(1, "aéé").unwrap();
        assert_eq!(s.get_value(1).unwrap(), "aé");
    }

    #[test]
    fn embedded_nul_ends_value() {
        let s = store();
        s.set_value(0, "ab\0cd").unwrap();
        assert_eq!(s.get_value(0).unwrap(), "ab");
    }

    #[test]
    fn end_without_begin_is_an_error() {
        let s = store();
        assert!(matches!(
            s.end_transaction(),
            Err(RegistryError::NoActiveTransaction)
        ));
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn registry_requires_initialize() {
        let r = Registry::new();
        assert!(matches!(r.store(), Err(RegistryError::NotInitialized)));
        assert!(!r.is_initialized());
    }
}
