//! Byte layout of the packed value buffer.
//!
//! Every entry owns a fixed slot of `max_len + 1` bytes; the extra byte is a
//! terminator that is never written. Offsets are a running sum:
//!
//! ```text
//! offsets[0] = 0
//! offsets[i] = offsets[i-1] + max_len[i-1] + 1
//! size       = offsets[last] + max_len[last] + 1
//! ```

use std::ops::Range;

use crate::schema::Schema;

/// Slot offsets computed once from a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    offsets: Vec<usize>,
    lens: Vec<usize>,
    size: usize,
}

impl Layout {
    pub fn new(schema: &Schema) -> Self {
        let lens: Vec<usize> = schema.entries().iter().map(|e| e.max_len).collect();
        let mut offsets = Vec::with_capacity(lens.len());
        let mut size = 0;
        for len in &lens {
            offsets.push(size);
            size += len + 1;
        }
        Self { offsets, lens, size }
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }

    /// Start of an entry's slot, or `None` past the end of the schema.
    pub fn offset(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Writable bytes of a slot, excluding its terminator.
    ///
    /// `index` must already be resolved against the schema.
    pub(crate) fn slot(&self, index: usize) -> Range<usize> {
        let start = self.offsets[index];
        start..start + self.lens[index]
    }

    /// Total buffer size in bytes.
    pub fn size(&self) -> usize {
        self.size
    }
}
