//! Addressing entries by position or by id.

use crate::error::RegistryError;
use crate::schema::Schema;

/// Anything that names a schema entry: a `usize` index or a string id.
pub trait EntryKey {
    fn resolve(&self, schema: &Schema) -> Result<usize, RegistryError>;
}

impl EntryKey for usize {
    fn resolve(&self, schema: &Schema) -> Result<usize, RegistryError> {
        if *self < schema.len() {
            Ok(*self)
        } else {
            Err(RegistryError::IndexOutOfRange {
                index: *self,
                len: schema.len(),
            })
        }
    }
}

impl EntryKey for str {
    fn resolve(&self, schema: &Schema) -> Result<usize, RegistryError> {
        schema.index_of(self).ok_or_else(|| RegistryError::NotFound {
            id: self.to_owned(),
        })
    }
}

impl EntryKey for String {
    fn resolve(&self, schema: &Schema) -> Result<usize, RegistryError> {
        self.as_str().resolve(schema)
    }
}

impl<K: EntryKey + ?Sized> EntryKey for &K {
    fn resolve(&self, schema: &Schema) -> Result<usize, RegistryError> {
        (**self).resolve(schema)
    }
}
