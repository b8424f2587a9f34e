use std::fmt::Display;

use crate::core::{
    db_type::FieldType,
    values::{DDate, DDateTime, DHiresTime, DReal, DRichReal, Value, utf8::Utf8Translator},
};

use super::Boundable;

/// A field scalar type that value ranges can be built over.
///
/// NULL is not part of the domain: the codec reports it as `None`.
pub trait ScalarValue: Boundable + Display + Send + Sync + 'static {
    const FIELD_TYPE: FieldType;

    fn into_value(self) -> Value;

    /// `None` for NULL and for values of another type.
    fn from_value(value: &Value) -> Option<Self>;

    fn parse_utf8(text: &str) -> Result<Option<Self>, String> {
        match Utf8Translator::parse_value(Self::FIELD_TYPE, text)? {
            Value::Null => Ok(None),
            value => Self::from_value(&value)
                .map(Some)
                .ok_or_else(|| format!("'{}' is not a {} value", text, Self::FIELD_TYPE)),
        }
    }

    fn to_utf8(&self) -> String {
        Utf8Translator::format_value(&self.into_value())
    }
}

macro_rules! impl_scalar_value {
    ($($t:ty => $tag:ident, $variant:ident;)*) => {
        $(
            impl ScalarValue for $t {
                const FIELD_TYPE: FieldType = FieldType::$tag;

                #[inline]
                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                #[inline]
                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_scalar_value! {
    bool => BOOL, Bool;
    char => CHAR, Char;
    DDate => DATE, Date;
    DDateTime => DATETIME, DateTime;
    DHiresTime => HIRESTIME, HiresTime;
    i8 => INT8, Int8;
    i16 => INT16, Int16;
    i32 => INT32, Int32;
    i64 => INT64, Int64;
    u8 => UINT8, UInt8;
    u16 => UINT16, UInt16;
    u32 => UINT32, UInt32;
    u64 => UINT64, UInt64;
    DReal => REAL, Real;
    DRichReal => RICHREAL, RichReal;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_reports_null_as_none() {
        assert_eq!(u32::parse_utf8("").unwrap(), None);
        assert_eq!(u32::parse_utf8("17").unwrap(), Some(17));
        assert!(u32::parse_utf8("x").is_err());
        assert_eq!(DDate::parse_utf8("2013/1/10").unwrap(), DDate::new(2013, 1, 10));
    }

    #[test]
    fn value_conversion_checks_variant() {
        assert_eq!(i16::from_value(&Value::Int16(-3)), Some(-3));
        assert_eq!(i16::from_value(&Value::Int32(-3)), None);
        assert_eq!(i16::from_value(&Value::Null), None);
        assert_eq!(true.into_value(), Value::Bool(true));
        assert_eq!(DReal::from_units(1_500_000).to_utf8(), "1.5");
    }
}
