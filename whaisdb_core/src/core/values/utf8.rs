//! Textual encoding of field values.
//!
//! The empty string is NULL for every type. Grammar per type:
//! - BOOL: `1`, `0`, `true`, `false` (case-insensitive)
//! - CHAR: exactly one Unicode scalar value
//! - DATE: `Y/M/D`, e.g. `2013/1/10`
//! - DATETIME: `Y/M/D h:m:s`
//! - HIRESTIME: `Y/M/D h:m:s.uuuuuu` (fraction optional, at most 6 digits)
//! - integers: decimal, range checked
//! - REAL, RICHREAL: signed decimal fraction, at most 6 (resp. 14) fractional digits

use std::str::FromStr;

use crate::core::db_type::FieldType;

use super::{
    DDate, DDateTime, DHiresTime, DReal, DRichReal, REAL_PRECISION_DIGITS,
    RICHREAL_PRECISION_DIGITS, Value,
};

pub struct Utf8Translator;

impl Utf8Translator {
    /// Decodes `text` as a value of `field_type`.
    pub fn parse_value(field_type: FieldType, text: &str) -> Result<Value, String> {
        if text.is_empty() {
            return Ok(Value::Null);
        }

        let value = match field_type {
            FieldType::BOOL => Value::Bool(parse_bool(text)?),
            FieldType::CHAR => Value::Char(parse_char(text)?),
            FieldType::DATE => Value::Date(parse_date(text)?),
            FieldType::DATETIME => Value::DateTime(parse_datetime(text)?),
            FieldType::HIRESTIME => Value::HiresTime(parse_hirestime(text)?),
            FieldType::INT8 => Value::Int8(parse_integer(text)?),
            FieldType::INT16 => Value::Int16(parse_integer(text)?),
            FieldType::INT32 => Value::Int32(parse_integer(text)?),
            FieldType::INT64 => Value::Int64(parse_integer(text)?),
            FieldType::UINT8 => Value::UInt8(parse_integer(text)?),
            FieldType::UINT16 => Value::UInt16(parse_integer(text)?),
            FieldType::UINT32 => Value::UInt32(parse_integer(text)?),
            FieldType::UINT64 => Value::UInt64(parse_integer(text)?),
            FieldType::REAL => Value::Real(parse_real(text)?),
            FieldType::RICHREAL => Value::RichReal(parse_rich_real(text)?),
            FieldType::TEXT => Value::Text(text.to_string()),
        };

        Ok(value)
    }

    /// Encodes `value`; `parse_value` of the result gives `value` back.
    pub fn format_value(value: &Value) -> String {
        match value {
            Value::Null => String::new(),
            Value::Bool(v) => if *v { "1".to_string() } else { "0".to_string() },
            Value::Char(v) => v.to_string(),
            Value::Date(v) => v.to_string(),
            Value::DateTime(v) => v.to_string(),
            Value::HiresTime(v) => v.to_string(),
            Value::Int8(v) => v.to_string(),
            Value::Int16(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int64(v) => v.to_string(),
            Value::UInt8(v) => v.to_string(),
            Value::UInt16(v) => v.to_string(),
            Value::UInt32(v) => v.to_string(),
            Value::UInt64(v) => v.to_string(),
            Value::Real(v) => v.to_string(),
            Value::RichReal(v) => v.to_string(),
            Value::Text(v) => v.clone(),
        }
    }
}

pub(crate) fn parse_bool(text: &str) -> Result<bool, String> {
    let text = text.trim();
    if text == "1" || text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text == "0" || text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("'{}' is not a boolean", text))
    }
}

pub(crate) fn parse_char(text: &str) -> Result<char, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("'{}' is not a single character", text)),
    }
}

pub(crate) fn parse_integer<T: FromStr>(text: &str) -> Result<T, String> {
    let text = text.trim();
    let digits = text.strip_prefix('+').unwrap_or(text);
    digits
        .parse::<T>()
        .map_err(|_| format!("'{}' is not a valid integer for this type", text))
}

fn parse_component<T: FromStr>(part: &str, what: &str) -> Result<T, String> {
    if part.is_empty() {
        return Err(format!("missing {}", what));
    }
    part.parse::<T>().map_err(|_| format!("invalid {} '{}'", what, part))
}

pub(crate) fn parse_date(text: &str) -> Result<DDate, String> {
    let text = text.trim();
    let mut parts = text.split('/');

    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("'{}' is not a date (expected Y/M/D)", text));
    };

    let year: i16 = parse_component(year, "year")?;
    let month: u8 = parse_component(month, "month")?;
    let day: u8 = parse_component(day, "day")?;

    DDate::new(year, month, day).ok_or_else(|| format!("'{}' is not a valid calendar date", text))
}

/// Splits `h:m:s[.fraction]` and returns the parts.
fn parse_time(text: &str) -> Result<(u8, u8, u8, Option<&str>), String> {
    let (clock, fraction) = match text.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (text, None),
    };

    let mut parts = clock.split(':');
    let (Some(hour), Some(minute), Some(second), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!("'{}' is not a time (expected h:m:s)", text));
    };

    Ok((
        parse_component(hour, "hour")?,
        parse_component(minute, "minute")?,
        parse_component(second, "second")?,
        fraction,
    ))
}

fn split_date_time(text: &str) -> Result<(&str, &str), String> {
    text.trim()
        .split_once(char::is_whitespace)
        .map(|(date, time)| (date, time.trim()))
        .ok_or_else(|| format!("'{}' is missing the time part", text))
}

pub(crate) fn parse_datetime(text: &str) -> Result<DDateTime, String> {
    let (date, time) = split_date_time(text)?;
    let date = parse_date(date)?;
    let (hour, minute, second, fraction) = parse_time(time)?;

    if fraction.is_some() {
        return Err(format!("'{}' has sub-second precision", text));
    }

    DDateTime::new(date, hour, minute, second).ok_or_else(|| format!("'{}' is not a valid time", text))
}

pub(crate) fn parse_hirestime(text: &str) -> Result<DHiresTime, String> {
    let (date, time) = split_date_time(text)?;
    let date = parse_date(date)?;
    let (hour, minute, second, fraction) = parse_time(time)?;

    let microsecond = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || digits.len() > 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(format!("'{}' has an invalid microsecond part", text));
            }
            let value: u32 = parse_component(digits, "microsecond")?;
            value * 10u32.pow(6 - digits.len() as u32)
        }
    };

    let datetime = DDateTime::new(date, hour, minute, second)
        .ok_or_else(|| format!("'{}' is not a valid time", text))?;

    DHiresTime::new(datetime, microsecond).ok_or_else(|| format!("'{}' is not a valid time", text))
}

/// Parses a signed decimal into units of `10^-digits`.
fn parse_fixed(text: &str, digits: u32) -> Result<i128, String> {
    let text = text.trim();
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let (integer, fraction) = body.split_once('.').unwrap_or((body, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (integer.is_empty() && fraction.is_empty()) || !all_digits(integer) || !all_digits(fraction) {
        return Err(format!("'{}' is not a decimal number", text));
    }
    if fraction.len() > digits as usize {
        return Err(format!("'{}' has more than {} fractional digits", text, digits));
    }

    let overflow = || format!("'{}' is out of range", text);

    let mut units: i128 = 0;
    for b in integer.bytes().chain(fraction.bytes()) {
        units = units
            .checked_mul(10)
            .and_then(|u| u.checked_sub((b - b'0') as i128))
            .ok_or_else(overflow)?;
    }
    units = units
        .checked_mul(10i128.pow(digits - fraction.len() as u32))
        .ok_or_else(overflow)?;

    // Accumulated as a negative number so that the minimum is reachable.
    if negative {
        Ok(units)
    } else {
        units.checked_neg().ok_or_else(overflow)
    }
}

pub(crate) fn parse_real(text: &str) -> Result<DReal, String> {
    let units = parse_fixed(text, REAL_PRECISION_DIGITS)?;
    i64::try_from(units)
        .map(DReal::from_units)
        .map_err(|_| format!("'{}' is out of range", text))
}

pub(crate) fn parse_rich_real(text: &str) -> Result<DRichReal, String> {
    parse_fixed(text, RICHREAL_PRECISION_DIGITS).map(DRichReal::from_units)
}
