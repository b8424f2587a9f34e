//! Scalar values stored in table fields.
//!
//! Calendar types use the proleptic Gregorian calendar with years in
//! `-32768..=32767`. Reals are fixed point: `DReal` counts millionths,
//! `DRichReal` counts units of 1e-14.

use std::fmt::{self, Display};

use super::db_type::FieldType;
use super::range::Boundable;

pub mod utf8;

pub const REAL_PRECISION_DIGITS: u32 = 6;
pub const RICHREAL_PRECISION_DIGITS: u32 = 14;

#[inline]
fn is_leap_year(year: i16) -> bool {
    let y = year as i32;
    (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
}

#[inline]
pub(crate) fn days_in_month(year: i16, month: u8) -> u8 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DDate {
    year: i16,
    month: u8,
    day: u8,
}

impl DDate {
    pub fn new(year: i16, month: u8, day: u8) -> Option<Self> {
        if month == 0 || month > 12 || day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(DDate { year, month, day })
    }

    #[inline]
    pub fn year(&self) -> i16 {
        self.year
    }

    #[inline]
    pub fn month(&self) -> u8 {
        self.month
    }

    #[inline]
    pub fn day(&self) -> u8 {
        self.day
    }
}

impl Boundable for DDate {
    fn minimum() -> Self {
        DDate { year: i16::MIN, month: 1, day: 1 }
    }

    fn maximum() -> Self {
        DDate { year: i16::MAX, month: 12, day: 31 }
    }

    fn prev(self) -> Self {
        if self.day > 1 {
            return DDate { day: self.day - 1, ..self };
        }
        if self.month > 1 {
            let month = self.month - 1;
            return DDate { month, day: days_in_month(self.year, month), ..self };
        }
        if self.year == i16::MIN {
            return self;
        }
        DDate { year: self.year - 1, month: 12, day: 31 }
    }

    fn next(self) -> Self {
        if self.day < days_in_month(self.year, self.month) {
            return DDate { day: self.day + 1, ..self };
        }
        if self.month < 12 {
            return DDate { month: self.month + 1, day: 1, ..self };
        }
        if self.year == i16::MAX {
            return self;
        }
        DDate { year: self.year + 1, month: 1, day: 1 }
    }
}

impl Display for DDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.year, self.month, self.day)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DDateTime {
    date: DDate,
    hour: u8,
    minute: u8,
    second: u8,
}

impl DDateTime {
    pub fn new(date: DDate, hour: u8, minute: u8, second: u8) -> Option<Self> {
        if hour > 23 || minute > 59 || second > 59 {
            return None;
        }
        Some(DDateTime { date, hour, minute, second })
    }

    #[inline]
    pub fn date(&self) -> DDate {
        self.date
    }

    #[inline]
    pub fn hour(&self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(&self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn second(&self) -> u8 {
        self.second
    }
}

impl Boundable for DDateTime {
    fn minimum() -> Self {
        DDateTime { date: DDate::minimum(), hour: 0, minute: 0, second: 0 }
    }

    fn maximum() -> Self {
        DDateTime { date: DDate::maximum(), hour: 23, minute: 59, second: 59 }
    }

    fn prev(self) -> Self {
        if self == Self::minimum() {
            return self;
        }
        if self.second > 0 {
            return DDateTime { second: self.second - 1, ..self };
        }
        if self.minute > 0 {
            return DDateTime { minute: self.minute - 1, second: 59, ..self };
        }
        if self.hour > 0 {
            return DDateTime { hour: self.hour - 1, minute: 59, second: 59, ..self };
        }
        DDateTime { date: self.date.prev(), hour: 23, minute: 59, second: 59 }
    }

    fn next(self) -> Self {
        if self == Self::maximum() {
            return self;
        }
        if self.second < 59 {
            return DDateTime { second: self.second + 1, ..self };
        }
        if self.minute < 59 {
            return DDateTime { minute: self.minute + 1, second: 0, ..self };
        }
        if self.hour < 23 {
            return DDateTime { hour: self.hour + 1, minute: 0, second: 0, ..self };
        }
        DDateTime { date: self.date.next(), hour: 0, minute: 0, second: 0 }
    }
}

impl Display for DDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{:02}:{:02}", self.date, self.hour, self.minute, self.second)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DHiresTime {
    datetime: DDateTime,
    microsecond: u32,
}

impl DHiresTime {
    pub fn new(datetime: DDateTime, microsecond: u32) -> Option<Self> {
        if microsecond > 999_999 {
            return None;
        }
        Some(DHiresTime { datetime, microsecond })
    }

    #[inline]
    pub fn datetime(&self) -> DDateTime {
        self.datetime
    }

    #[inline]
    pub fn microsecond(&self) -> u32 {
        self.microsecond
    }
}

impl Boundable for DHiresTime {
    fn minimum() -> Self {
        DHiresTime { datetime: DDateTime::minimum(), microsecond: 0 }
    }

    fn maximum() -> Self {
        DHiresTime { datetime: DDateTime::maximum(), microsecond: 999_999 }
    }

    fn prev(self) -> Self {
        if self == Self::minimum() {
            return self;
        }
        if self.microsecond > 0 {
            return DHiresTime { microsecond: self.microsecond - 1, ..self };
        }
        DHiresTime { datetime: self.datetime.prev(), microsecond: 999_999 }
    }

    fn next(self) -> Self {
        if self == Self::maximum() {
            return self;
        }
        if self.microsecond < 999_999 {
            return DHiresTime { microsecond: self.microsecond + 1, ..self };
        }
        DHiresTime { datetime: self.datetime.next(), microsecond: 0 }
    }
}

impl Display for DHiresTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.datetime, self.microsecond)
    }
}

/// Writes `units / 10^digits` as a decimal, without trailing fractional zeros.
fn write_fixed(f: &mut fmt::Formatter<'_>, units: i128, digits: u32) -> fmt::Result {
    let scale = 10u128.pow(digits);
    let magnitude = units.unsigned_abs();
    let integer = magnitude / scale;
    let fraction = magnitude % scale;

    if units < 0 {
        f.write_str("-")?;
    }
    write!(f, "{}", integer)?;

    if fraction != 0 {
        let digits_str = format!("{:0width$}", fraction, width = digits as usize);
        write!(f, ".{}", digits_str.trim_end_matches('0'))?;
    }
    Ok(())
}

/// Fixed point real with 6 fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DReal(i64);

impl DReal {
    #[inline]
    pub fn from_units(units: i64) -> Self {
        DReal(units)
    }

    #[inline]
    pub fn units(&self) -> i64 {
        self.0
    }

    pub fn from_integer(value: i64) -> Option<Self> {
        value.checked_mul(10i64.pow(REAL_PRECISION_DIGITS)).map(DReal)
    }
}

impl Boundable for DReal {
    fn minimum() -> Self {
        DReal(i64::MIN)
    }

    fn maximum() -> Self {
        DReal(i64::MAX)
    }

    fn prev(self) -> Self {
        DReal(self.0.saturating_sub(1))
    }

    fn next(self) -> Self {
        DReal(self.0.saturating_add(1))
    }
}

impl Display for DReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.0 as i128, REAL_PRECISION_DIGITS)
    }
}

/// Fixed point real with 14 fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DRichReal(i128);

impl DRichReal {
    #[inline]
    pub fn from_units(units: i128) -> Self {
        DRichReal(units)
    }

    #[inline]
    pub fn units(&self) -> i128 {
        self.0
    }

    pub fn from_integer(value: i64) -> Self {
        DRichReal(value as i128 * 10i128.pow(RICHREAL_PRECISION_DIGITS))
    }
}

impl Boundable for DRichReal {
    fn minimum() -> Self {
        DRichReal(i128::MIN)
    }

    fn maximum() -> Self {
        DRichReal(i128::MAX)
    }

    fn prev(self) -> Self {
        DRichReal(self.0.saturating_sub(1))
    }

    fn next(self) -> Self {
        DRichReal(self.0.saturating_add(1))
    }
}

impl Display for DRichReal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fixed(f, self.0, RICHREAL_PRECISION_DIGITS)
    }
}

/// A field value as it crosses the table boundary.
///
/// Values of one field always share a variant, apart from `Null`, which
/// orders before every other value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Value {
    Null,
    Bool(bool),
    Char(char),
    Date(DDate),
    DateTime(DDateTime),
    HiresTime(DHiresTime),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    UInt8(u8),
    UInt16(u16),
    UInt32(u32),
    UInt64(u64),
    Real(DReal),
    RichReal(DRichReal),
    Text(String),
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type tag of a non-null value.
    pub fn field_type(&self) -> Option<FieldType> {
        let field_type = match self {
            Value::Null => return None,
            Value::Bool(_) => FieldType::BOOL,
            Value::Char(_) => FieldType::CHAR,
            Value::Date(_) => FieldType::DATE,
            Value::DateTime(_) => FieldType::DATETIME,
            Value::HiresTime(_) => FieldType::HIRESTIME,
            Value::Int8(_) => FieldType::INT8,
            Value::Int16(_) => FieldType::INT16,
            Value::Int32(_) => FieldType::INT32,
            Value::Int64(_) => FieldType::INT64,
            Value::UInt8(_) => FieldType::UINT8,
            Value::UInt16(_) => FieldType::UINT16,
            Value::UInt32(_) => FieldType::UINT32,
            Value::UInt64(_) => FieldType::UINT64,
            Value::Real(_) => FieldType::REAL,
            Value::RichReal(_) => FieldType::RICHREAL,
            Value::Text(_) => FieldType::TEXT,
        };
        Some(field_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_steps_across_month_and_year() {
        let d = DDate::new(2013, 1, 31).unwrap();
        assert_eq!(d.next(), DDate::new(2013, 2, 1).unwrap());
        assert_eq!(DDate::new(2013, 2, 1).unwrap().prev(), d);

        assert_eq!(DDate::new(2012, 2, 28).unwrap().next(), DDate::new(2012, 2, 29).unwrap());
        assert_eq!(DDate::new(2013, 2, 28).unwrap().next(), DDate::new(2013, 3, 1).unwrap());
        assert_eq!(DDate::new(1999, 12, 31).unwrap().next(), DDate::new(2000, 1, 1).unwrap());
        assert_eq!(DDate::new(2000, 1, 1).unwrap().prev(), DDate::new(1999, 12, 31).unwrap());
    }

    #[test]
    fn date_rejects_invalid_days() {
        assert!(DDate::new(2013, 2, 29).is_none());
        assert!(DDate::new(1900, 2, 29).is_none());
        assert!(DDate::new(2000, 2, 29).is_some());
        assert!(DDate::new(2013, 13, 1).is_none());
        assert!(DDate::new(2013, 4, 31).is_none());
    }

    #[test]
    fn calendar_types_saturate() {
        assert_eq!(DDate::maximum().next(), DDate::maximum());
        assert_eq!(DDate::minimum().prev(), DDate::minimum());
        assert_eq!(DDateTime::maximum().next(), DDateTime::maximum());
        assert_eq!(DDateTime::minimum().prev(), DDateTime::minimum());
        assert_eq!(DHiresTime::maximum().next(), DHiresTime::maximum());
        assert_eq!(DHiresTime::minimum().prev(), DHiresTime::minimum());
    }

    #[test]
    fn datetime_rolls_into_next_day() {
        let date = DDate::new(2013, 1, 10).unwrap();
        let dt = DDateTime::new(date, 23, 59, 59).unwrap();
        let rolled = dt.next();
        assert_eq!(rolled.date(), DDate::new(2013, 1, 11).unwrap());
        assert_eq!((rolled.hour(), rolled.minute(), rolled.second()), (0, 0, 0));
        assert_eq!(rolled.prev(), dt);

        let hires = DHiresTime::new(dt, 999_999).unwrap();
        assert_eq!(hires.next().datetime(), rolled);
        assert_eq!(hires.next().prev(), hires);
    }

    #[test]
    fn fixed_point_display() {
        assert_eq!(DReal::from_units(12_500_000).to_string(), "12.5");
        assert_eq!(DReal::from_units(-250_000).to_string(), "-0.25");
        assert_eq!(DReal::from_integer(3).unwrap().to_string(), "3");
        assert_eq!(DReal::from_units(1).to_string(), "0.000001");
        assert_eq!(DRichReal::from_units(1).to_string(), "0.00000000000001");
        assert_eq!(DReal::minimum().to_string(), "-9223372036854.775808");
    }

    #[test]
    fn null_orders_first() {
        assert!(Value::Null < Value::UInt32(0));
        assert_eq!(Value::Null.field_type(), None);
        assert_eq!(Value::Real(DReal::from_units(1)).field_type(), Some(FieldType::REAL));
    }
}
