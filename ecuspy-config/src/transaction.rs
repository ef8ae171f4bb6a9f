//! Scoped transaction guard.
//!
//! A [`Transaction`] begins on creation and must be closed with
//! [`commit`](Transaction::commit) or [`rollback`](Transaction::rollback).
//! A guard dropped without either rolls back.
//!
//! Because nesting is a shared counter, a rollback anywhere aborts every
//! open transaction. An outer guard committing after an inner rollback gets
//! [`RegistryError::NoActiveTransaction`].

use crate::error::RegistryError;
use crate::key::EntryKey;
use crate::store::ValueStore;
use crate::value::FromConfigValue;

#[must_use = "a transaction dropped without commit() is rolled back"]
#[derive(Debug)]
pub struct Transaction<'a> {
    store: &'a ValueStore,
    open: bool,
}

impl<'a> Transaction<'a> {
    pub(crate) fn begin(store: &'a ValueStore) -> Self {
        store.begin_transaction();
        Self { store, open: true }
    }

    pub fn store(&self) -> &'a ValueStore {
        self.store
    }

    /// Value as this transaction sees it, including uncommitted writes.
    pub fn value(&self, key: impl EntryKey) -> Result<String, RegistryError> {
        self.store.working_value(key)
    }

    /// Typed read of the transaction-local value.
    pub fn get<T: FromConfigValue>(&self, key: impl EntryKey) -> Result<T, RegistryError> {
        self.store.working_get(key)
    }

    pub fn validate(&self, key: impl EntryKey, candidate: &str) -> Result<bool, RegistryError> {
        self.store.validate(key, candidate)
    }

    pub fn set_value(&self, key: impl EntryKey, value: &str) -> Result<(), RegistryError> {
        self.store.set_value(key, value)
    }

    pub fn set_validated(&self, key: impl EntryKey, value: &str) -> Result<(), RegistryError> {
        self.store.set_validated(key, value)
    }

    /// End this transaction. Writes become visible once the outermost
    /// transaction commits.
    pub fn commit(mut self) -> Result<(), RegistryError> {
        self.open = false;
        self.store.end_transaction()
    }

    /// Abort this and every enclosing transaction.
    pub fn rollback(mut self) {
        self.open = false;
        self.store.abort_transaction();
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        if self.open {
            self.store.abort_transaction();
        }
    }
}
