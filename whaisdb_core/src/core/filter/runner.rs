use log::{debug, trace};

use crate::{
    configuration::Configuration,
    core::{
        error::{FilterError, Result},
        range::{Interval, Range},
        table::{RowIndex, Table},
    },
};

use super::{
    field_values::TableFieldValuesFilter,
    rules::{FilterRule, ScanContext},
};

/// Rows selected by the runner before any field rule, tied to the table
/// extent it was computed for.
struct BaseRows {
    allocated_rows: RowIndex,
    rows: Range<RowIndex>,
}

/// Evaluates `TableFieldValuesFilter`s against one table.
///
/// Rules and row ranges accumulate over `add_filter_rules` calls until
/// they are reset, so the runner can be reused between queries.
pub struct TableFilterRunner<'a, T: Table + ?Sized> {
    table: &'a T,
    config: Configuration,
    scan: ScanContext,
    rows_included: Range<RowIndex>,
    rows_excluded: Range<RowIndex>,
    base: Option<BaseRows>,
    rules: Vec<FilterRule>,
}

impl<'a, T: Table + ?Sized> TableFilterRunner<'a, T> {
    pub fn new(table: &'a T) -> Self {
        Self::with_configuration(table, Configuration::default())
    }

    pub fn with_configuration(table: &'a T, config: Configuration) -> Self {
        TableFilterRunner {
            table,
            scan: ScanContext::new(&config),
            config,
            rows_included: Range::new(),
            rows_excluded: Range::new(),
            base: None,
            rules: Vec::new(),
        }
    }

    #[inline]
    pub fn table(&self) -> &'a T {
        self.table
    }

    #[inline]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Builds one rule per field of `filter` and records its row ranges.
    ///
    /// Either every field of the filter is accepted or the runner is left
    /// unchanged.
    pub fn add_filter_rules(&mut self, filter: &TableFieldValuesFilter) -> Result<()> {
        let mut rules = self.rules.clone();

        for values in filter.all_field_values() {
            let field = self.table.retrieve_field(values.name())?;

            let descriptor = self.table.describe_field(field)?;
            if descriptor.is_array {
                return Err(FilterError::FieldInvalidType(format!(
                    "field {} is an array of {}",
                    values.name(),
                    descriptor.field_type
                )));
            }
            if !descriptor.field_type.is_filterable() {
                return Err(FilterError::FieldInvalidType(format!(
                    "field {} holds {} values",
                    values.name(),
                    descriptor.field_type
                )));
            }
            if descriptor.field_type != values.field_type() {
                return Err(FilterError::FieldInvalidType(format!(
                    "field {} is of type {}, filtered as {}",
                    values.name(),
                    descriptor.field_type,
                    values.field_type()
                )));
            }

            match rules.iter_mut().find(|rule| rule.field() == field) {
                Some(rule) => rule.values_mut().join(values),
                None => rules.push(FilterRule::for_field(self.table, field, values.clone())),
            }
        }

        self.rules = rules;
        self.rows_included.join_range(filter.rows(false));
        self.rows_excluded.join_range(filter.rows(true));
        self.base = None;

        debug!(
            "Filter rules: {} fields ({} indexed), rows included {}, rows excluded {}",
            self.rules.len(),
            self.rules.iter().filter(|r| r.is_search_indexed()).count(),
            self.rows_included,
            self.rows_excluded
        );

        Ok(())
    }

    /// Drops the cached base row set; the next run recomputes it from the
    /// table extent and the recorded row ranges.
    pub fn reset_rows_filter(&mut self) {
        self.base = None;
    }

    /// Forgets the included and excluded row ranges added so far.
    pub fn clear_row_ranges(&mut self) {
        self.rows_included.clear();
        self.rows_excluded.clear();
        self.base = None;
    }

    /// Drops the field rules; `add_filter_rules` rebuilds them.
    pub fn reset_filter_rules(&mut self) {
        self.rules.clear();
    }

    /// `(field name, is_search_indexed)` of each rule, in execution order.
    pub fn rules(&self) -> Vec<(&str, bool)> {
        self.execution_order()
            .into_iter()
            .map(|rule| (rule.values().name(), rule.is_search_indexed()))
            .collect()
    }

    fn execution_order(&self) -> Vec<&FilterRule> {
        let mut order: Vec<&FilterRule> = self.rules.iter().collect();
        if self.config.prefer_indexed_rules() {
            order.sort_by_key(|rule| !rule.is_search_indexed());
        }
        order
    }

    fn base_rows(&mut self) -> Range<RowIndex> {
        let allocated_rows = self.table.allocated_rows();

        if let Some(base) = &self.base {
            if base.allocated_rows == allocated_rows {
                return base.rows.clone();
            }
        }

        let mut rows = if allocated_rows == 0 {
            Range::new()
        } else {
            Range::from_interval(Interval::new(0, allocated_rows - 1))
        };
        if !self.rows_included.is_empty() {
            rows.intersect(&self.rows_included);
        }
        rows.exclude(&self.rows_excluded);

        self.base = Some(BaseRows {
            allocated_rows,
            rows: rows.clone(),
        });
        rows
    }

    /// Matching rows as a canonical range.
    pub fn run_range(&mut self) -> Result<Range<RowIndex>> {
        let mut rows = self.base_rows();
        trace!("Base rows: {}", rows);

        for rule in self.execution_order() {
            if rows.is_empty() {
                break;
            }

            let matched = rule.match_rows(self.table, &rows, &self.scan)?;
            rows.intersect(&matched);

            trace!(
                "Rule on {} ({}): {} rows left",
                rule.values().name(),
                if rule.is_search_indexed() { "indexed" } else { "scan" },
                rows.value_count()
            );
        }

        Ok(rows)
    }

    /// Matching row indexes, ascending and without duplicates.
    pub fn run(&mut self) -> Result<Vec<RowIndex>> {
        let rows = self.run_range()?;
        Ok(rows.values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        db_type::{FieldDescriptor, FieldType},
        table::memory_table::MemoryTable,
        values::Value,
    };

    fn people() -> MemoryTable {
        let table = MemoryTable::new(
            "people",
            &[
                ("age", FieldDescriptor::new(FieldType::UINT8)),
                ("score", FieldDescriptor::new(FieldType::INT32)),
                ("tags", FieldDescriptor::array_of(FieldType::UINT32)),
                ("note", FieldDescriptor::new(FieldType::TEXT)),
            ],
        );

        for row in 0..100u32 {
            let age = if row % 10 == 0 { Value::Null } else { Value::UInt8((row % 60) as u8) };
            table
                .add_row(vec![age, Value::Int32(row as i32 - 50), Value::Null, Value::Null])
                .unwrap();
        }
        table
    }

    #[test]
    fn empty_filter_selects_all_rows() {
        let table = people();
        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&TableFieldValuesFilter::new()).unwrap();
        assert_eq!(runner.run().unwrap(), (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn rows_are_clipped_to_the_table() {
        let table = people();
        let mut filter = TableFieldValuesFilter::new();
        filter.add_row(90, 5000, false).add_row(95, 96, true);

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();
        assert_eq!(runner.run().unwrap(), vec![90, 91, 92, 93, 94, 97, 98, 99]);
    }

    #[test]
    fn fields_intersect() {
        let table = people();
        let mut filter = TableFieldValuesFilter::new();
        filter.add_value("age", FieldType::UINT8, "20", "29", false).unwrap();
        filter.add_value("score", FieldType::INT32, "-30", "0", false).unwrap();

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();

        let expected: Vec<RowIndex> = (0..100u32)
            .filter(|r| r % 10 != 0 && (20..=29).contains(&(r % 60)))
            .filter(|r| (-30..=0).contains(&(*r as i32 - 50)))
            .collect();
        assert_eq!(runner.run().unwrap(), expected);
    }

    #[test]
    fn indexed_rules_run_first() {
        let table = people();
        let score = table.retrieve_field("score").unwrap();
        table.create_index(score, None).unwrap();

        let mut filter = TableFieldValuesFilter::new();
        filter.add_value("age", FieldType::UINT8, "1", "5", false).unwrap();
        filter.add_value("score", FieldType::INT32, "0", "49", false).unwrap();

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();
        assert_eq!(runner.rules(), vec![("score", true), ("age", false)]);

        let mut in_order = TableFilterRunner::with_configuration(
            &table,
            Configuration {
                prefer_indexed_rules: Some(false),
                ..Default::default()
            },
        );
        in_order.add_filter_rules(&filter).unwrap();
        assert_eq!(in_order.rules(), vec![("age", false), ("score", true)]);

        assert_eq!(runner.run().unwrap(), in_order.run().unwrap());
    }

    #[test]
    fn repeated_filters_join_per_field() {
        let table = people();
        let mut first = TableFieldValuesFilter::new();
        first.add_value("age", FieldType::UINT8, "1", "2", false).unwrap();
        let mut second = TableFieldValuesFilter::new();
        second.add_value("age", FieldType::UINT8, "3", "3", false).unwrap();
        second.add_value("age", FieldType::UINT8, "2", "2", true).unwrap();

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&first).unwrap();
        runner.add_filter_rules(&second).unwrap();

        assert_eq!(runner.rules().len(), 1);
        assert_eq!(runner.run().unwrap(), vec![1, 3, 61, 63]);
    }

    #[test]
    fn invalid_fields_leave_runner_untouched() {
        let table = people();
        let mut good = TableFieldValuesFilter::new();
        good.add_value("age", FieldType::UINT8, "1", "1", false).unwrap();

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&good).unwrap();

        let mut missing = TableFieldValuesFilter::new();
        missing.add_row(0, 0, false);
        missing.add_value("score", FieldType::INT32, "0", "0", false).unwrap();
        missing.add_value("height", FieldType::UINT8, "1", "1", false).unwrap();
        assert_eq!(
            runner.add_filter_rules(&missing),
            Err(FilterError::FieldNotExistent("height".to_string()))
        );

        let mut array = TableFieldValuesFilter::new();
        array.add_value("tags", FieldType::UINT32, "1", "1", false).unwrap();
        assert!(matches!(
            runner.add_filter_rules(&array),
            Err(FilterError::FieldInvalidType(_))
        ));

        let mut wrong_type = TableFieldValuesFilter::new();
        wrong_type.add_value("age", FieldType::INT64, "1", "1", false).unwrap();
        assert!(matches!(
            runner.add_filter_rules(&wrong_type),
            Err(FilterError::FieldInvalidType(_))
        ));

        let mut text = TableFieldValuesFilter::new();
        text.add_value("note", FieldType::UINT32, "1", "1", false).unwrap();
        assert_eq!(
            runner.add_filter_rules(&text),
            Err(FilterError::FieldInvalidType("field note holds TEXT values".to_string()))
        );

        assert_eq!(runner.rules(), vec![("age", false)]);
        assert_eq!(runner.run().unwrap(), vec![1, 61]);
    }

    #[test]
    fn resets_are_independent() {
        let table = people();
        let mut filter = TableFieldValuesFilter::new();
        filter.add_row(0, 9, false);
        filter.add_value("score", FieldType::INT32, "-45", "100", false).unwrap();

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();
        assert_eq!(runner.run().unwrap(), vec![5, 6, 7, 8, 9]);

        runner.reset_rows_filter();
        assert_eq!(runner.run().unwrap(), vec![5, 6, 7, 8, 9]);

        runner.reset_filter_rules();
        assert!(runner.rules().is_empty());
        assert_eq!(runner.run().unwrap(), (0..10).collect::<Vec<_>>());

        runner.clear_row_ranges();
        assert_eq!(runner.run().unwrap().len(), 100);
    }

    #[test]
    fn rows_filter_reset_keeps_row_ranges() {
        let table = people();
        let mut filter = TableFieldValuesFilter::new();
        filter.add_row(10, 12, false);

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();
        assert_eq!(runner.run().unwrap(), vec![10, 11, 12]);

        runner.reset_rows_filter();
        assert_eq!(runner.run().unwrap(), vec![10, 11, 12]);
    }

    #[test]
    fn base_rows_follow_table_growth() {
        let table = people();
        let mut filter = TableFieldValuesFilter::new();
        filter.add_row(98, 200, false);

        let mut runner = TableFilterRunner::new(&table);
        runner.add_filter_rules(&filter).unwrap();
        assert_eq!(runner.run().unwrap(), vec![98, 99]);

        table.allocate_rows(2).unwrap();
        assert_eq!(runner.run().unwrap(), vec![98, 99, 100, 101]);
    }
}
