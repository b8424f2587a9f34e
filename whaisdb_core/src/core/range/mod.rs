//! Discrete interval sets.
//!
//! A `Range<T>` keeps its intervals sorted by `from`, and no two of them
//! overlap or touch: for consecutive intervals `a`, `b` it always holds that
//! `a.to().next() < b.from()`. Every value set therefore has exactly one
//! representation, and structural equality is set equality.

use std::fmt::{self, Display};

use itertools::Itertools;
use smallvec::SmallVec;

pub mod scalar;

pub type IntervalVec<T> = SmallVec<[Interval<T>; 8]>;

/// A totally ordered domain with bounds and unit steps.
///
/// `prev` and `next` saturate at the domain bounds.
pub trait Boundable: Copy + Ord + fmt::Debug {
    fn minimum() -> Self;
    fn maximum() -> Self;
    fn prev(self) -> Self;
    fn next(self) -> Self;
}

macro_rules! impl_boundable_int {
    ($($t:ty),*) => {
        $(
            impl Boundable for $t {
                #[inline]
                fn minimum() -> Self {
                    <$t>::MIN
                }

                #[inline]
                fn maximum() -> Self {
                    <$t>::MAX
                }

                #[inline]
                fn prev(self) -> Self {
                    self.saturating_sub(1)
                }

                #[inline]
                fn next(self) -> Self {
                    self.saturating_add(1)
                }
            }
        )*
    };
}

impl_boundable_int!(i8, i16, i32, i64, u8, u16, u32, u64);

impl Boundable for bool {
    #[inline]
    fn minimum() -> Self {
        false
    }

    #[inline]
    fn maximum() -> Self {
        true
    }

    #[inline]
    fn prev(self) -> Self {
        false
    }

    #[inline]
    fn next(self) -> Self {
        true
    }
}

// Surrogate code points are not chars; stepping jumps over them.
impl Boundable for char {
    #[inline]
    fn minimum() -> Self {
        '\u{0}'
    }

    #[inline]
    fn maximum() -> Self {
        char::MAX
    }

    #[inline]
    fn prev(self) -> Self {
        match self {
            '\u{0}' => '\u{0}',
            '\u{E000}' => '\u{D7FF}',
            c => char::from_u32(c as u32 - 1).unwrap_or(c),
        }
    }

    #[inline]
    fn next(self) -> Self {
        match self {
            char::MAX => char::MAX,
            '\u{D7FF}' => '\u{E000}',
            c => char::from_u32(c as u32 + 1).unwrap_or(c),
        }
    }
}

/// Inclusive interval `[from, to]` with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval<T> {
    from: T,
    to: T,
}

impl<T: Copy + Ord> Interval<T> {
    /// Builds `[from, to]`, swapping the bounds when given in reverse.
    #[inline]
    pub fn new(from: T, to: T) -> Self {
        if to < from {
            Interval { from: to, to: from }
        } else {
            Interval { from, to }
        }
    }

    #[inline]
    pub fn single(value: T) -> Self {
        Interval {
            from: value,
            to: value,
        }
    }

    #[inline]
    pub fn from(&self) -> T {
        self.from
    }

    #[inline]
    pub fn to(&self) -> T {
        self.to
    }

    #[inline]
    pub fn contains(&self, value: &T) -> bool {
        self.from <= *value && *value <= self.to
    }

    #[inline]
    pub fn overlaps(&self, other: &Interval<T>) -> bool {
        self.from <= other.to && other.from <= self.to
    }
}

impl<T: Display> Display for Interval<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.from, self.to)
    }
}

/// Set of values of `T` held as canonical interval list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range<T> {
    intervals: IntervalVec<T>,
}

impl<T: Boundable> Default for Range<T> {
    fn default() -> Self {
        Range::new()
    }
}

impl<T: Boundable> Range<T> {
    /// The empty set.
    #[inline]
    pub fn new() -> Self {
        Range {
            intervals: IntervalVec::new(),
        }
    }

    /// The whole domain `[T::minimum(), T::maximum()]`.
    pub fn universal() -> Self {
        Range::from_interval(Interval::new(T::minimum(), T::maximum()))
    }

    pub fn from_interval(interval: Interval<T>) -> Self {
        let mut intervals = IntervalVec::new();
        intervals.push(interval);
        Range { intervals }
    }

    pub fn from_intervals(intervals: impl IntoIterator<Item = Interval<T>>) -> Self {
        let mut range = Range::new();
        for interval in intervals {
            range.join(interval);
        }
        range
    }

    /// Collects single values, coalescing consecutive ones into intervals.
    pub fn from_values(values: impl IntoIterator<Item = T>) -> Self {
        let mut intervals: IntervalVec<T> = IntervalVec::new();

        for value in values.into_iter().sorted_unstable().dedup() {
            match intervals.last_mut() {
                Some(last) if last.to.next() == value => last.to = value,
                _ => intervals.push(Interval::single(value)),
            }
        }

        Range { intervals }
    }

    #[inline]
    pub fn intervals(&self) -> &[Interval<T>] {
        &self.intervals
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Interval<T>> {
        self.intervals.iter()
    }

    /// Number of intervals (not values).
    #[inline]
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn is_universal(&self) -> bool {
        self.intervals.len() == 1
            && self.intervals[0].from == T::minimum()
            && self.intervals[0].to == T::maximum()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    pub fn contains(&self, value: &T) -> bool {
        let idx = self.intervals.partition_point(|iv| iv.to < *value);
        idx < self.intervals.len() && self.intervals[idx].from <= *value
    }

    /// Index of the first interval that overlaps or touches a joined
    /// interval starting at `from`.
    #[inline]
    fn find_join_insert_place(&self, from: T) -> usize {
        // `next` saturates, so an interval ending at the maximum always qualifies.
        self.intervals.partition_point(|iv| iv.to.next() < from)
    }

    /// Adds the values of `interval` to the set.
    pub fn join(&mut self, interval: Interval<T>) -> &mut Self {
        let place = self.find_join_insert_place(interval.from);
        let reach = interval.to.next();

        let mut from = interval.from;
        let mut to = interval.to;
        let mut end = place;

        while end < self.intervals.len() && self.intervals[end].from <= reach {
            from = from.min(self.intervals[end].from);
            to = to.max(self.intervals[end].to);
            end += 1;
        }

        if end == place {
            self.intervals.insert(place, Interval { from, to });
        } else {
            self.intervals[place] = Interval { from, to };
            self.intervals.drain(place + 1..end);
        }

        self
    }

    pub fn join_range(&mut self, other: &Range<T>) -> &mut Self {
        if self.intervals.is_empty() {
            self.intervals = other.intervals.clone();
            return self;
        }

        for interval in other.intervals.iter() {
            self.join(*interval);
        }

        self
    }

    /// Keeps only the values that are also in `other`.
    pub fn intersect(&mut self, other: &Range<T>) -> &mut Self {
        if self.intervals.is_empty() || other.intervals.is_empty() {
            self.intervals.clear();
            return self;
        }

        let a = &self.intervals;
        let b = &other.intervals;

        let mut out: IntervalVec<T> = IntervalVec::new();
        let mut i = 0usize;
        let mut j = 0usize;

        while i < a.len() && j < b.len() {
            let from = a[i].from.max(b[j].from);
            let to = a[i].to.min(b[j].to);

            if from <= to {
                out.push(Interval { from, to });
            }

            // Advance the interval that ends first.
            if a[i].to < b[j].to {
                i += 1;
            } else {
                j += 1;
            }
        }

        self.intervals = out;
        self
    }

    /// Replaces the set with `[minimum, maximum]` minus the set.
    pub fn complement(&mut self) -> &mut Self {
        if self.intervals.is_empty() {
            self.intervals.push(Interval::new(T::minimum(), T::maximum()));
            return self;
        }

        let mut out: IntervalVec<T> = IntervalVec::new();
        let mut gap_start = Some(T::minimum());

        for interval in self.intervals.iter() {
            if let Some(start) = gap_start {
                // Only the first interval may start exactly at the gap start.
                if start < interval.from {
                    out.push(Interval {
                        from: start,
                        to: interval.from.prev(),
                    });
                }
            }

            gap_start = if interval.to == T::maximum() {
                None
            } else {
                Some(interval.to.next())
            };
        }

        if let Some(start) = gap_start {
            out.push(Interval {
                from: start,
                to: T::maximum(),
            });
        }

        self.intervals = out;
        self
    }

    /// Removes the values of `other` from the set.
    pub fn exclude(&mut self, other: &Range<T>) -> &mut Self {
        if self.intervals.is_empty() || other.intervals.is_empty() {
            return self;
        }

        let mut remaining = other.clone();
        remaining.complement();
        self.intersect(&remaining)
    }
}

impl Range<u32> {
    /// Count of values covered by the set.
    pub fn value_count(&self) -> u64 {
        self.intervals
            .iter()
            .map(|iv| (iv.to - iv.from) as u64 + 1)
            .sum()
    }

    /// Every value in ascending order.
    pub fn values(&self) -> impl Iterator<Item = u32> + '_ {
        self.intervals.iter().flat_map(|iv| iv.from..=iv.to)
    }
}

impl<'a, T> IntoIterator for &'a Range<T> {
    type Item = &'a Interval<T>;
    type IntoIter = std::slice::Iter<'a, Interval<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.intervals.iter()
    }
}

impl<T: Display> Display for Range<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (idx, interval) in self.intervals.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", interval)?;
        }
        f.write_str("}")
    }
}

#[cfg(test)]
mod range_tests {
    include!("range_tests.rs");
}
