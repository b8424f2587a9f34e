use std::collections::HashMap;

use crate::core::{
    db_type::FieldType,
    error::{FilterError, Result},
    range::{Boundable, Interval, Range, scalar::ScalarValue},
    table::RowIndex,
    values::{DDate, DDateTime, DHiresTime, DReal, DRichReal, Value},
};

/// Values searched for in one field: a value set plus the NULL marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueRange<T> {
    values: Range<T>,
    null: bool,
}

impl<T: ScalarValue> Default for ValueRange<T> {
    fn default() -> Self {
        ValueRange::new()
    }
}

impl<T: ScalarValue> ValueRange<T> {
    pub fn new() -> Self {
        ValueRange {
            values: Range::new(),
            null: false,
        }
    }

    #[inline]
    pub fn values(&self) -> &Range<T> {
        &self.values
    }

    #[inline]
    pub fn has_null(&self) -> bool {
        self.null
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && !self.null
    }

    /// Adds `[from, to]`; both NULL marks a NULL search, one NULL bound is open.
    pub fn add(&mut self, from: Option<T>, to: Option<T>) {
        match (from, to) {
            (None, None) => self.null = true,
            (from, to) => {
                self.values.join(Interval::new(
                    from.unwrap_or_else(T::minimum),
                    to.unwrap_or_else(T::maximum),
                ));
            }
        }
    }

    pub fn join(&mut self, other: &ValueRange<T>) {
        self.values.join_range(&other.values);
        self.null |= other.null;
    }

    pub fn matches(&self, value: Option<&T>) -> bool {
        match value {
            None => self.null,
            Some(v) => self.values.contains(v),
        }
    }

    fn add_utf8(&mut self, from: &str, to: &str) -> std::result::Result<(), (String, String)> {
        let from_value = T::parse_utf8(from).map_err(|reason| (from.to_string(), reason))?;
        let to_value = T::parse_utf8(to).map_err(|reason| (to.to_string(), reason))?;
        self.add(from_value, to_value);
        Ok(())
    }

    fn matches_value(&self, value: &Value) -> bool {
        if value.is_null() {
            return self.null;
        }
        // Values of another type never match.
        T::from_value(value).is_some_and(|v| self.values.contains(&v))
    }

    fn bounds(&self) -> Vec<(Value, Value)> {
        let mut bounds = Vec::with_capacity(self.values.len() + 1);
        if self.null {
            bounds.push((Value::Null, Value::Null));
        }
        bounds.extend(
            self.values
                .iter()
                .map(|iv| (iv.from().into_value(), iv.to().into_value())),
        );
        bounds
    }

    fn intervals_utf8(&self) -> Vec<(String, String)> {
        let mut out = Vec::with_capacity(self.values.len() + 1);
        if self.null {
            out.push((String::new(), String::new()));
        }
        out.extend(self.values.iter().map(|iv| (iv.from().to_utf8(), iv.to().to_utf8())));
        out
    }
}

/// A `ValueRange` for each scalar field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypedRange {
    Bool(ValueRange<bool>),
    Char(ValueRange<char>),
    Date(ValueRange<DDate>),
    DateTime(ValueRange<DDateTime>),
    HiresTime(ValueRange<DHiresTime>),
    Int8(ValueRange<i8>),
    Int16(ValueRange<i16>),
    Int32(ValueRange<i32>),
    Int64(ValueRange<i64>),
    UInt8(ValueRange<u8>),
    UInt16(ValueRange<u16>),
    UInt32(ValueRange<u32>),
    UInt64(ValueRange<u64>),
    Real(ValueRange<DReal>),
    RichReal(ValueRange<DRichReal>),
}

macro_rules! dispatch {
    ($typed:expr, $range:ident => $body:expr) => {
        match $typed {
            TypedRange::Bool($range) => $body,
            TypedRange::Char($range) => $body,
            TypedRange::Date($range) => $body,
            TypedRange::DateTime($range) => $body,
            TypedRange::HiresTime($range) => $body,
            TypedRange::Int8($range) => $body,
            TypedRange::Int16($range) => $body,
            TypedRange::Int32($range) => $body,
            TypedRange::Int64($range) => $body,
            TypedRange::UInt8($range) => $body,
            TypedRange::UInt16($range) => $body,
            TypedRange::UInt32($range) => $body,
            TypedRange::UInt64($range) => $body,
            TypedRange::Real($range) => $body,
            TypedRange::RichReal($range) => $body,
        }
    };
}

macro_rules! dispatch_pair {
    ($left:expr, $right:expr, $a:ident, $b:ident => $body:expr) => {
        match ($left, $right) {
            (TypedRange::Bool($a), TypedRange::Bool($b)) => $body,
            (TypedRange::Char($a), TypedRange::Char($b)) => $body,
            (TypedRange::Date($a), TypedRange::Date($b)) => $body,
            (TypedRange::DateTime($a), TypedRange::DateTime($b)) => $body,
            (TypedRange::HiresTime($a), TypedRange::HiresTime($b)) => $body,
            (TypedRange::Int8($a), TypedRange::Int8($b)) => $body,
            (TypedRange::Int16($a), TypedRange::Int16($b)) => $body,
            (TypedRange::Int32($a), TypedRange::Int32($b)) => $body,
            (TypedRange::Int64($a), TypedRange::Int64($b)) => $body,
            (TypedRange::UInt8($a), TypedRange::UInt8($b)) => $body,
            (TypedRange::UInt16($a), TypedRange::UInt16($b)) => $body,
            (TypedRange::UInt32($a), TypedRange::UInt32($b)) => $body,
            (TypedRange::UInt64($a), TypedRange::UInt64($b)) => $body,
            (TypedRange::Real($a), TypedRange::Real($b)) => $body,
            (TypedRange::RichReal($a), TypedRange::RichReal($b)) => $body,
            (left, right) => panic!(
                "cannot merge {} values into a {} range",
                right.field_type(),
                left.field_type()
            ),
        }
    };
}

impl TypedRange {
    /// Empty range for `field_type`; `None` for types without value ranges.
    pub fn empty(field_type: FieldType) -> Option<Self> {
        let typed = match field_type {
            FieldType::BOOL => TypedRange::Bool(ValueRange::new()),
            FieldType::CHAR => TypedRange::Char(ValueRange::new()),
            FieldType::DATE => TypedRange::Date(ValueRange::new()),
            FieldType::DATETIME => TypedRange::DateTime(ValueRange::new()),
            FieldType::HIRESTIME => TypedRange::HiresTime(ValueRange::new()),
            FieldType::INT8 => TypedRange::Int8(ValueRange::new()),
            FieldType::INT16 => TypedRange::Int16(ValueRange::new()),
            FieldType::INT32 => TypedRange::Int32(ValueRange::new()),
            FieldType::INT64 => TypedRange::Int64(ValueRange::new()),
            FieldType::UINT8 => TypedRange::UInt8(ValueRange::new()),
            FieldType::UINT16 => TypedRange::UInt16(ValueRange::new()),
            FieldType::UINT32 => TypedRange::UInt32(ValueRange::new()),
            FieldType::UINT64 => TypedRange::UInt64(ValueRange::new()),
            FieldType::REAL => TypedRange::Real(ValueRange::new()),
            FieldType::RICHREAL => TypedRange::RichReal(ValueRange::new()),
            FieldType::TEXT => return None,
        };
        Some(typed)
    }

    pub fn field_type(&self) -> FieldType {
        fn tag<T: ScalarValue>(_: &ValueRange<T>) -> FieldType {
            T::FIELD_TYPE
        }
        dispatch!(self, range => tag(range))
    }

    pub fn is_empty(&self) -> bool {
        dispatch!(self, range => range.is_empty())
    }

    pub fn has_null(&self) -> bool {
        dispatch!(self, range => range.has_null())
    }

    /// Merges `other` in.
    ///
    /// # Panics
    ///
    /// When `other` holds another type.
    pub fn join(&mut self, other: &TypedRange) {
        dispatch_pair!(self, other, a, b => a.join(b))
    }

    /// Whether a stored field value is in the set.
    pub fn contains_value(&self, value: &Value) -> bool {
        dispatch!(self, range => range.matches_value(value))
    }

    /// `(min, max)` searches covering the set, NULL search first.
    pub fn bounds(&self) -> Vec<(Value, Value)> {
        dispatch!(self, range => range.bounds())
    }

    /// Intervals as text; the NULL marker reads `("", "")`.
    pub fn intervals_utf8(&self) -> Vec<(String, String)> {
        dispatch!(self, range => range.intervals_utf8())
    }

    pub(crate) fn add_utf8(&mut self, from: &str, to: &str) -> std::result::Result<(), (String, String)> {
        dispatch!(self, range => range.add_utf8(from, to))
    }
}

/// Included and excluded values of one filtered field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValues {
    name: String,
    included: TypedRange,
    excluded: TypedRange,
}

impl FieldValues {
    fn new(name: &str, field_type: FieldType) -> Result<Self> {
        let empty = TypedRange::empty(field_type).ok_or_else(|| {
            FilterError::FieldInvalidType(format!("field {} is of type {}", name, field_type))
        })?;

        Ok(FieldValues {
            name: name.to_string(),
            included: empty.clone(),
            excluded: empty,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn field_type(&self) -> FieldType {
        self.included.field_type()
    }

    #[inline]
    pub fn included(&self) -> &TypedRange {
        &self.included
    }

    #[inline]
    pub fn excluded(&self) -> &TypedRange {
        &self.excluded
    }

    /// A row value passes when it is included (or nothing is) and not excluded.
    pub fn matches(&self, value: &Value) -> bool {
        (self.included.is_empty() || self.included.contains_value(value))
            && !self.excluded.contains_value(value)
    }

    pub(crate) fn join(&mut self, other: &FieldValues) {
        self.included.join(&other.included);
        self.excluded.join(&other.excluded);
    }
}

/// Declarative row selection: row intervals plus per-field value ranges.
///
/// Exclusions are only recorded here; they are subtracted when a runner
/// evaluates the filter.
#[derive(Debug, Clone, Default)]
pub struct TableFieldValuesFilter {
    rows_included: Range<RowIndex>,
    rows_excluded: Range<RowIndex>,
    fields: Vec<FieldValues>,
    by_name: HashMap<String, usize, ahash::RandomState>,
}

impl TableFieldValuesFilter {
    pub fn new() -> Self {
        TableFieldValuesFilter::default()
    }

    pub fn add_row(&mut self, from: RowIndex, to: RowIndex, exclude: bool) -> &mut Self {
        let interval = Interval::new(from, to);
        if exclude {
            self.rows_excluded.join(interval);
        } else {
            self.rows_included.join(interval);
        }
        self
    }

    /// Adds `[from, to]`, given as text, to the values searched in `field`.
    pub fn add_value(
        &mut self,
        field: &str,
        field_type: FieldType,
        from: &str,
        to: &str,
        exclude: bool,
    ) -> Result<&mut Self> {
        let position = self.by_name.get(field).copied();

        let mut values = match position {
            Some(idx) => {
                let existing = &self.fields[idx];
                if existing.field_type() != field_type {
                    return Err(FilterError::FieldInvalidType(format!(
                        "field {} was first filtered as {}, not {}",
                        field,
                        existing.field_type(),
                        field_type
                    )));
                }
                existing.clone()
            }
            None => FieldValues::new(field, field_type)?,
        };

        let side = if exclude { &mut values.excluded } else { &mut values.included };
        side.add_utf8(from, to)
            .map_err(|(value, reason)| FilterError::InvalidValue {
                field: field.to_string(),
                value,
                reason,
            })?;

        match position {
            Some(idx) => self.fields[idx] = values,
            None => {
                self.by_name.insert(field.to_string(), self.fields.len());
                self.fields.push(values);
            }
        }

        Ok(self)
    }

    /// Row intervals recorded so far, in canonical form.
    pub fn rows_intervals(&self, exclude: bool) -> Vec<(RowIndex, RowIndex)> {
        self.rows(exclude).iter().map(|iv| (iv.from(), iv.to())).collect()
    }

    #[inline]
    pub fn rows(&self, exclude: bool) -> &Range<RowIndex> {
        if exclude { &self.rows_excluded } else { &self.rows_included }
    }

    /// Filtered field names in the order they were first added.
    pub fn fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.name())
    }

    pub fn field_values(&self, field: &str) -> Option<&FieldValues> {
        self.by_name.get(field).map(|idx| &self.fields[*idx])
    }

    pub(crate) fn all_field_values(&self) -> &[FieldValues] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.rows_included.is_empty() && self.rows_excluded.is_empty() && self.fields.is_empty()
    }

    pub fn clear(&mut self) {
        self.rows_included.clear();
        self.rows_excluded.clear();
        self.fields.clear();
        self.by_name.clear();
    }
}
