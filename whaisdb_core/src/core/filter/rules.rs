use crate::{
    configuration::Configuration,
    core::{
        error::Result,
        range::{Interval, Range},
        table::{FieldIndex, RowIndex, Table},
        values::Value,
    },
};

use super::field_values::FieldValues;

#[cfg(feature = "enable_parallelism")]
use once_cell::sync::OnceCell;

/// Evaluates a row predicate over candidate rows, in batches.
pub(crate) struct ScanContext {
    batch_size: usize,
    #[cfg(feature = "enable_parallelism")]
    threads: usize,
    // Built on the first scan spanning more than one batch.
    #[cfg(feature = "enable_parallelism")]
    pool: OnceCell<Option<rayon::ThreadPool>>,
}

impl ScanContext {
    pub(crate) fn new(config: &Configuration) -> Self {
        ScanContext {
            batch_size: config.scan_batch_size(),
            #[cfg(feature = "enable_parallelism")]
            threads: config.concurrent_threads(),
            #[cfg(feature = "enable_parallelism")]
            pool: OnceCell::new(),
        }
    }

    #[cfg(feature = "enable_parallelism")]
    fn pool(&self) -> Option<&rayon::ThreadPool> {
        if self.threads <= 1 {
            return None;
        }

        self.pool
            .get_or_init(|| {
                match rayon::ThreadPoolBuilder::new().num_threads(self.threads).build() {
                    Ok(pool) => Some(pool),
                    Err(e) => {
                        log::warn!("Falling back to sequential scans: {}", e);
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Splits `rows` into intervals of at most `batch_size` rows.
    fn batches(&self, rows: &Range<RowIndex>) -> Vec<Interval<RowIndex>> {
        let step = (self.batch_size as u64).min(RowIndex::MAX as u64 + 1);
        let mut out = Vec::new();

        for iv in rows.iter() {
            let mut start = iv.from() as u64;
            let end = iv.to() as u64;
            while start <= end {
                let last = (start + step - 1).min(end);
                out.push(Interval::new(start as RowIndex, last as RowIndex));
                start = last + 1;
            }
        }

        out
    }

    pub(crate) fn scan<F>(&self, rows: &Range<RowIndex>, is_matching: F) -> Result<Range<RowIndex>>
    where
        F: Fn(RowIndex) -> Result<bool> + Sync,
    {
        fn scan_batch<F>(batch: Interval<RowIndex>, is_matching: &F) -> Result<Vec<RowIndex>>
        where
            F: Fn(RowIndex) -> Result<bool>,
        {
            let mut matched = Vec::new();
            for row in batch.from()..=batch.to() {
                if is_matching(row)? {
                    matched.push(row);
                }
            }
            Ok(matched)
        }

        let batches = self.batches(rows);

        #[cfg(feature = "enable_parallelism")]
        if batches.len() > 1 {
            if let Some(pool) = self.pool() {
                use rayon::prelude::*;

                let parts: Result<Vec<Vec<RowIndex>>> = pool.install(|| {
                    batches
                        .par_iter()
                        .map(|batch| scan_batch(*batch, &is_matching))
                        .collect()
                });
                return Ok(Range::from_values(parts?.into_iter().flatten()));
            }
        }

        let mut matched = Vec::new();
        for batch in batches {
            matched.extend(scan_batch(batch, &is_matching)?);
        }
        Ok(Range::from_values(matched))
    }
}

/// Field predicate answered through the table's index.
#[derive(Debug, Clone)]
pub struct IndexedRule {
    field: FieldIndex,
    values: FieldValues,
}

impl IndexedRule {
    pub fn new(field: FieldIndex, values: FieldValues) -> Self {
        IndexedRule { field, values }
    }

    /// Rows among `candidates` whose value is in one of the `bounds` searches.
    fn search<T: Table + ?Sized>(
        &self,
        table: &T,
        bounds: &[(Value, Value)],
        candidates: &Range<RowIndex>,
    ) -> Result<Range<RowIndex>> {
        let (Some(first), Some(last)) = (candidates.intervals().first(), candidates.intervals().last()) else {
            return Ok(Range::new());
        };

        let mut found = Vec::new();
        for (min, max) in bounds {
            found.extend(table.match_rows(min, max, first.from(), last.to(), self.field)?);
        }

        let mut rows = Range::from_values(found);
        rows.intersect(candidates);
        Ok(rows)
    }

    pub fn match_rows<T: Table + ?Sized>(
        &self,
        table: &T,
        candidates: &Range<RowIndex>,
    ) -> Result<Range<RowIndex>> {
        let mut rows = if self.values.included().is_empty() {
            candidates.clone()
        } else {
            self.search(table, &self.values.included().bounds(), candidates)?
        };

        if !self.values.excluded().is_empty() && !rows.is_empty() {
            let excluded = self.search(table, &self.values.excluded().bounds(), &rows)?;
            rows.exclude(&excluded);
        }

        Ok(rows)
    }
}

/// Field predicate answered by reading each candidate row's value.
#[derive(Debug, Clone)]
pub struct ScanRule {
    field: FieldIndex,
    values: FieldValues,
}

impl ScanRule {
    pub fn new(field: FieldIndex, values: FieldValues) -> Self {
        ScanRule { field, values }
    }
}

#[derive(Debug, Clone)]
pub enum FilterRule {
    Indexed(IndexedRule),
    Scan(ScanRule),
}

impl FilterRule {
    /// Picks the index backed strategy when the field has an index.
    pub fn for_field<T: Table + ?Sized>(table: &T, field: FieldIndex, values: FieldValues) -> Self {
        if table.is_indexed(field) {
            FilterRule::Indexed(IndexedRule::new(field, values))
        } else {
            FilterRule::Scan(ScanRule::new(field, values))
        }
    }

    #[inline]
    pub fn field(&self) -> FieldIndex {
        match self {
            FilterRule::Indexed(rule) => rule.field,
            FilterRule::Scan(rule) => rule.field,
        }
    }

    #[inline]
    pub fn values(&self) -> &FieldValues {
        match self {
            FilterRule::Indexed(rule) => &rule.values,
            FilterRule::Scan(rule) => &rule.values,
        }
    }

    pub(crate) fn values_mut(&mut self) -> &mut FieldValues {
        match self {
            FilterRule::Indexed(rule) => &mut rule.values,
            FilterRule::Scan(rule) => &mut rule.values,
        }
    }

    #[inline]
    pub fn is_search_indexed(&self) -> bool {
        matches!(self, FilterRule::Indexed(_))
    }

    pub fn row_is_matching<T: Table + ?Sized>(&self, table: &T, row: RowIndex) -> Result<bool> {
        let value = table.get_value(row, self.field())?;
        Ok(self.values().matches(&value))
    }

    /// The subset of `candidates` satisfying the rule.
    pub(crate) fn match_rows<T: Table + ?Sized>(
        &self,
        table: &T,
        candidates: &Range<RowIndex>,
        scan: &ScanContext,
    ) -> Result<Range<RowIndex>> {
        match self {
            FilterRule::Indexed(rule) => rule.match_rows(table, candidates),
            FilterRule::Scan(_) => scan.scan(candidates, |row| self.row_is_matching(table, row)),
        }
    }
}
