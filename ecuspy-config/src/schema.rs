//! Entry descriptors and the immutable schema they form.
//!
//! A [`Schema`] is an ordered list of [`Entry`] values. An entry's position is
//! its identity for the lifetime of the store; ids are unique and resolve to
//! exactly one position.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::error::SchemaError;

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Settings page an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Wifi,
    Elm327,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Wifi => write!(f, "wifi"),
            Category::Elm327 => write!(f, "elm327"),
        }
    }
}

/// Value-type tag used to select a validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    String,
    Double,
    Custom,
}

/// Width and signedness of an integer entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntWidth {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
}

impl IntWidth {
    pub fn is_signed(self) -> bool {
        matches!(self, IntWidth::I8 | IntWidth::I16 | IntWidth::I32 | IntWidth::I64)
    }

    pub fn value_type(self) -> ValueType {
        match self {
            IntWidth::I8 => ValueType::Int8,
            IntWidth::U8 => ValueType::UInt8,
            IntWidth::I16 => ValueType::Int16,
            IntWidth::U16 => ValueType::UInt16,
            IntWidth::I32 => ValueType::Int32,
            IntWidth::U32 => ValueType::UInt32,
            IntWidth::I64 => ValueType::Int64,
            IntWidth::U64 => ValueType::UInt64,
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

mod sealed {
    pub trait Sealed {}
}

/// Rust integer types an integer entry can be declared with.
///
/// Sealed: the width of [`IntBounds`] always matches the type its bounds
/// were written in.
pub trait BoundedInt: sealed::Sealed + Copy + Into<i128> {
    const WIDTH: IntWidth;
}

macro_rules! bounded_int {
    ($($ty:ty => $width:ident),* $(,)?) => {
        $(
            impl sealed::Sealed for $ty {}
            impl BoundedInt for $ty {
                const WIDTH: IntWidth = IntWidth::$width;
            }
        )*
    };
}

bounded_int! {
    i8 => I8, u8 => U8, i16 => I16, u16 => U16,
    i32 => I32, u32 => U32, i64 => I64, u64 => U64,
}

/// Inclusive bounds of an integer entry, tagged with the declared width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntBounds {
    width: IntWidth,
    min: i128,
    max: i128,
}

impl IntBounds {
    pub fn new<T: BoundedInt>(min: T, max: T) -> Self {
        Self {
            width: T::WIDTH,
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn width(&self) -> IntWidth {
        self.width
    }

    pub fn min(&self) -> i128 {
        self.min
    }

    pub fn max(&self) -> i128 {
        self.max
    }

    pub fn contains(&self, value: i128) -> bool {
        (self.min..=self.max).contains(&value)
    }

    // Bounds were constructed from a value of `width`, so the narrowing
    // conversions below cannot fail.
    fn manifest_bounds(&self) -> ManifestBounds {
        if self.width.is_signed() {
            ManifestBounds::Signed {
                min: self.min as i64,
                max: self.max as i64,
            }
        } else {
            ManifestBounds::Unsigned {
                min: self.min as u64,
                max: self.max as u64,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Custom validators
// ---------------------------------------------------------------------------

type CheckFn = dyn Fn(&Entry, &str) -> bool + Send + Sync;

/// Schema-supplied predicate for [`ValueKind::Custom`] entries.
#[derive(Clone)]
pub struct CustomValidator(Arc<CheckFn>);

impl CustomValidator {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&Entry, &str) -> bool + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn check(&self, entry: &Entry, candidate: &str) -> bool {
        (self.0)(entry, candidate)
    }
}

impl fmt::Debug for CustomValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomValidator(..)")
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// What an entry stores and how candidates are checked.
#[derive(Debug, Clone)]
pub enum ValueKind {
    Bool,
    Int(IntBounds),
    Double { min: f64, max: f64 },
    String,
    Custom(CustomValidator),
}

impl ValueKind {
    /// Integer entry bounded by `[min, max]` in the width of `T`.
    pub fn int<T: BoundedInt>(min: T, max: T) -> Self {
        ValueKind::Int(IntBounds::new(min, max))
    }

    pub fn double(min: f64, max: f64) -> Self {
        ValueKind::Double { min, max }
    }

    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Entry, &str) -> bool + Send + Sync + 'static,
    {
        ValueKind::Custom(CustomValidator::new(check))
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            ValueKind::Bool => ValueType::Bool,
            ValueKind::Int(bounds) => bounds.width().value_type(),
            ValueKind::Double { .. } => ValueType::Double,
            ValueKind::String => ValueType::String,
            ValueKind::Custom(_) => ValueType::Custom,
        }
    }
}

/// One configuration field: identity, presentation, type and slot size.
#[derive(Debug, Clone)]
pub struct Entry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: Category,
    pub kind: ValueKind,
    /// Largest value in bytes; the slot reserves one more for the terminator.
    pub max_len: usize,
}

impl Entry {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        category: Category,
        kind: ValueKind,
        max_len: usize,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            category,
            kind,
            max_len,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn value_type(&self) -> ValueType {
        self.kind.value_type()
    }

    fn check_bounds(&self) -> Result<(), SchemaError> {
        let invalid = |reason: String| SchemaError::InvalidBounds {
            id: self.id.clone(),
            reason,
        };
        match &self.kind {
            ValueKind::Int(b) if b.min() > b.max() => {
                Err(invalid(format!("min {} > max {}", b.min(), b.max())))
            }
            ValueKind::Double { min, max } if !min.is_finite() || !max.is_finite() => {
                Err(invalid("bounds must be finite".to_string()))
            }
            ValueKind::Double { min, max } if min > max => {
                Err(invalid(format!("min {min} > max {max}")))
            }
            _ => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered, immutable set of entries with unique ids.
#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
}

impl Schema {
    /// Build a schema, rejecting empty lists, duplicate ids, zero-length
    /// slots and inverted bounds.
    pub fn new(entries: Vec<Entry>) -> Result<Self, SchemaError> {
        if entries.is_empty() {
            return Err(SchemaError::Empty);
        }
        let mut by_id = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            if entry.max_len == 0 {
                return Err(SchemaError::ZeroLength {
                    id: entry.id.clone(),
                });
            }
            entry.check_bounds()?;
            if by_id.insert(entry.id.clone(), index).is_some() {
                return Err(SchemaError::DuplicateId {
                    id: entry.id.clone(),
                    index,
                });
            }
        }
        Ok(Self { entries, by_id })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    /// Entries of one category with their positions, in schema order.
    pub fn in_category(&self, category: Category) -> impl Iterator<Item = (usize, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.category == category)
    }

    /// Describe the schema grouped by category, in order of first appearance.
    pub fn manifest(&self) -> Manifest {
        let mut categories: Vec<ManifestCategory> = Vec::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let option = ManifestOption::from_entry(index, entry);
            match categories.iter_mut().find(|c| c.category == entry.category) {
                Some(group) => group.options.push(option),
                None => categories.push(ManifestCategory {
                    category: entry.category,
                    options: vec![option],
                }),
            }
        }
        Manifest(categories)
    }
}

// ---------------------------------------------------------------------------
// Manifest
// ---------------------------------------------------------------------------

/// Serializable description of a schema for settings front ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Manifest(pub Vec<ManifestCategory>);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestCategory {
    pub category: Category,
    pub options: Vec<ManifestOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ManifestOption {
    pub index: usize,
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub value_type: ValueType,
    pub max_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<ManifestBounds>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ManifestBounds {
    Signed { min: i64, max: i64 },
    Unsigned { min: u64, max: u64 },
    Double { min: f64, max: f64 },
}

impl ManifestOption {
    fn from_entry(index: usize, entry: &Entry) -> Self {
        let bounds = match &entry.kind {
            ValueKind::Int(b) => Some(b.manifest_bounds()),
            ValueKind::Double { min, max } => Some(ManifestBounds::Double {
                min: *min,
                max: *max,
            }),
            _ => None,
        };
        Self {
            index,
            id: entry.id.clone(),
            name: entry.name.clone(),
            description: entry.description.clone(),
            value_type: entry.value_type(),
            max_len: entry.max_len,
            bounds,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
