//! Conversion from stored text to native values.

/// Types readable from a stored value with [`crate::store::ValueStore::get`].
///
/// Conversion never re-validates bounds; that happened when the value was
/// written.
pub trait FromConfigValue: Sized {
    /// Name reported in [`crate::RegistryError::Parse`].
    const TYPE_NAME: &'static str;

    /// Parse raw stored text, or `None` if it is not a valid `Self`.
    fn from_config_value(raw: &str) -> Option<Self>;
}

impl FromConfigValue for String {
    const TYPE_NAME: &'static str = "string";

    fn from_config_value(raw: &str) -> Option<Self> {
        Some(raw.to_owned())
    }
}

/// Only the canonical literals `true` and `false` are accepted.
impl FromConfigValue for bool {
    const TYPE_NAME: &'static str = "bool";

    fn from_config_value(raw: &str) -> Option<Self> {
        match raw {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }
}

macro_rules! from_str_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromConfigValue for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_config_value(raw: &str) -> Option<Self> {
                    raw.parse().ok()
                }
            }
        )*
    };
}

from_str_value!(i8, u8, i16, u16, i32, u32, i64, u64, isize, usize, f32, f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_requires_canonical_literal() {
        assert_eq!(bool::from_config_value("true"), Some(true));
        assert_eq!(bool::from_config_value("false"), Some(false));
        assert_eq!(bool::from_config_value("True"), None);
        assert_eq!(bool::from_config_value("TRUE"), None);
        assert_eq!(bool::from_config_value("yes"), None);
    }

    #[test]
    fn integers_parse_base_ten() {
        assert_eq!(i32::from_config_value("1234"), Some(1234));
        assert_eq!(i32::from_config_value("-7"), Some(-7));
        assert_eq!(u8::from_config_value("256"), None);
        assert_eq!(i32::from_config_value(""), None);
        assert_eq!(i32::from_config_value("not-a-number"), None);
    }

    #[test]
    fn doubles_parse() {
        assert_eq!(f64::from_config_value("10.1"), Some(10.1));
        assert_eq!(f64::from_config_value("x"), None);
        assert_eq!(<f64 as FromConfigValue>::TYPE_NAME, "f64");
    }
}
