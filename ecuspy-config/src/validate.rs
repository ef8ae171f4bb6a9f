//! Per-type validation of candidate values.
//!
//! [`validator_for`] is the fixed table from [`ValueType`] to predicate.
//! Custom entries are not in the table; [`validate`] calls their own
//! predicate instead.

use crate::schema::{Entry, ValueKind, ValueType};

/// A validation predicate over an entry and a candidate string.
pub type Predicate = fn(&Entry, &str) -> bool;

/// Look up the built-in predicate for a value type.
///
/// Returns `None` for [`ValueType::Custom`].
pub fn validator_for(value_type: ValueType) -> Option<Predicate> {
    match value_type {
        ValueType::Bool => Some(validate_bool),
        ValueType::Int8
        | ValueType::UInt8
        | ValueType::Int16
        | ValueType::UInt16
        | ValueType::Int32
        | ValueType::UInt32
        | ValueType::Int64
        | ValueType::UInt64 => Some(validate_int),
        ValueType::String => Some(validate_string),
        ValueType::Double => Some(validate_double),
        ValueType::Custom => None,
    }
}

/// Check `candidate` against `entry`'s type, bounds, or custom predicate.
pub fn validate(entry: &Entry, candidate: &str) -> bool {
    match &entry.kind {
        ValueKind::Custom(check) => check.check(entry, candidate),
        kind => validator_for(kind.value_type()).is_some_and(|p| p(entry, candidate)),
    }
}

fn validate_bool(_entry: &Entry, candidate: &str) -> bool {
    matches!(candidate, "true" | "false")
}

fn validate_int(entry: &Entry, candidate: &str) -> bool {
    let ValueKind::Int(bounds) = &entry.kind else {
        return false;
    };
    candidate
        .parse::<i128>()
        .is_ok_and(|value| bounds.contains(value))
}

fn validate_string(_entry: &Entry, _candidate: &str) -> bool {
    true
}

fn validate_double(entry: &Entry, candidate: &str) -> bool {
    let ValueKind::Double { min, max } = entry.kind else {
        return false;
    };
    candidate
        .parse::<f64>()
        .is_ok_and(|value| (min..=max).contains(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Category;

    fn entry(kind: ValueKind) -> Entry {
        Entry::new("e", "e", Category::Wifi, kind, 16)
    }

    #[test]
    fn custom_type_has_no_table_entry() {
        assert!(validator_for(ValueType::Custom).is_none());
        assert!(validator_for(ValueType::UInt64).is_some());
    }

    #[test]
    fn bool_is_strict() {
        let e = entry(ValueKind::Bool);
        assert!(validate(&e, "true"));
        assert!(validate(&e, "false"));
        assert!(!validate(&e, "True"));
        assert!(!validate(&e, "1"));
        assert!(!validate(&e, ""));
    }

    #[test]
    fn signed_bounds() {
        let e = entry(ValueKind::int(-128i8, 127i8));
        assert!(validate(&e, "-128"));
        assert!(validate(&e, "127"));
        assert!(!validate(&e, "128"));
        assert!(!validate(&e, "-129"));
    }

    #[test]
    fn full_u64_range() {
        let e = entry(ValueKind::int(0u64, u64::MAX));
        assert!(validate(&e, "18446744073709551615"));
        assert!(!validate(&e, "18446744073709551616"));
    }

    #[test]
    fn double_rejects_nan_and_out_of_range() {
        let e = entry(ValueKind::double(0.0, 10.1));
        assert!(validate(&e, "10.1"));
        assert!(validate(&e, "0"));
        assert!(!validate(&e, "10.2"));
        assert!(!validate(&e, "NaN"));
        assert!(!validate(&e, "inf"));
        assert!(!validate(&e, "ten"));
    }

    #[test]
    fn string_accepts_anything() {
        assert!(validate(&entry(ValueKind::String), ""));
        assert!(validate(&entry(ValueKind::String), "any \u{1F680} text"));
    }

    #[test]
    fn custom_predicate_sees_entry() {
        let e = Entry::new(
            "id5",
            "name5",
            Category::Wifi,
            ValueKind::custom(|entry, s| entry.id == "id5" && s == "kuku"),
            15,
        );
        assert!(validate(&e, "kuku"));
        assert!(!validate(&e, "kuk"));
    }
}
