//! Validator table tests, one `#[case]` per candidate.

use ecuspy_config::{Category, Entry, Schema, ValueKind, ValueStore};
use rstest::rstest;

fn single(kind: ValueKind, max_len: usize) -> ValueStore {
    ValueStore::new(Schema::new(vec![Entry::new("e", "e", Category::Wifi, kind, max_len)]).unwrap())
}

#[rstest]
#[case("0", true)]
#[case("200", true)]
#[case("57", true)]
#[case("201", false)]
#[case("-1", false)]
#[case("abc", false)]
#[case("", false)]
#[case("1.5", false)]
fn uint8_bounded_0_to_200(#[case] candidate: &str, #[case] expected: bool) {
    let s = single(ValueKind::int(0u8, 200u8), 3);
    assert_eq!(s.validate("e", candidate).unwrap(), expected, "candidate {candidate:?}");
}

#[rstest]
#[case("-32768", true)]
#[case("32767", true)]
#[case("32768", false)]
#[case("-32769", false)]
fn int16_full_range(#[case] candidate: &str, #[case] expected: bool) {
    let s = single(ValueKind::int(i16::MIN, i16::MAX), 6);
    assert_eq!(s.validate(0, candidate).unwrap(), expected);
}

#[rstest]
#[case("0.0", true)]
#[case("10.1", true)]
#[case("5", true)]
#[case("10.11", false)]
#[case("-0.5", false)]
#[case("five", false)]
fn double_bounded(#[case] candidate: &str, #[case] expected: bool) {
    let s = single(ValueKind::double(0.0, 10.1), 10);
    assert_eq!(s.validate("e", candidate).unwrap(), expected);
}

#[rstest]
#[case("true", true)]
#[case("false", true)]
#[case("True", false)]
#[case("TRUE", false)]
#[case("yes", false)]
fn bool_literals(#[case] candidate: &str, #[case] expected: bool) {
    let s = single(ValueKind::Bool, 5);
    assert_eq!(s.validate("e", candidate).unwrap(), expected);
}

#[rstest]
#[case("kuku", true)]
#[case("KUKU", false)]
#[case("", false)]
fn custom_predicate(#[case] candidate: &str, #[case] expected: bool) {
    let s = single(ValueKind::custom(|_, s| s == "kuku"), 15);
    assert_eq!(s.validate("e", candidate).unwrap(), expected);
}

#[test]
fn validate_does_not_store() {
    let s = single(ValueKind::String, 8);
    assert!(s.validate("e", "anything").unwrap());
    assert_eq!(s.get_value("e").unwrap(), "");
}
