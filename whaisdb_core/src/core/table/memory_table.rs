use std::collections::{BTreeMap, HashMap};

use log::{info, trace};
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::core::{db_type::FieldDescriptor, error::TableError, values::Value};

use super::{FieldIndex, IndexProgress, RowIndex, Table};

/// Rows between two progress reports while building an index.
const INDEX_PROGRESS_STEP: usize = 4096;

type FieldIndexMap = BTreeMap<Value, SmallVec<[RowIndex; 4]>>;

struct MemoryField {
    name: String,
    descriptor: FieldDescriptor,
}

#[derive(Default)]
struct TableState {
    rows: RowIndex,
    columns: Vec<Vec<Value>>,
    indexes: Vec<Option<FieldIndexMap>>,
}

/// Column oriented in-memory table with optional ordered field indexes.
pub struct MemoryTable {
    name: String,
    fields: Vec<MemoryField>,
    by_name: HashMap<String, FieldIndex, ahash::RandomState>,
    state: RwLock<TableState>,
}

impl MemoryTable {
    pub fn new(name: &str, fields: &[(&str, FieldDescriptor)]) -> Self {
        let mut by_name: HashMap<String, FieldIndex, ahash::RandomState> =
            HashMap::with_hasher(Default::default());

        let fields: Vec<MemoryField> = fields
            .iter()
            .enumerate()
            .map(|(idx, (field_name, descriptor))| {
                by_name.insert(field_name.to_string(), idx as FieldIndex);
                MemoryField {
                    name: field_name.to_string(),
                    descriptor: *descriptor,
                }
            })
            .collect();

        let state = TableState {
            rows: 0,
            columns: fields.iter().map(|_| Vec::new()).collect(),
            indexes: fields.iter().map(|_| None).collect(),
        };

        MemoryTable {
            name: name.to_string(),
            fields,
            by_name,
            state: RwLock::new(state),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self, field: FieldIndex) -> Result<FieldDescriptor, TableError> {
        self.fields
            .get(field as usize)
            .map(|f| f.descriptor)
            .ok_or(TableError::InvalidField(field))
    }

    fn check_value(&self, field: FieldIndex, value: &Value) -> Result<(), TableError> {
        let descriptor = self.descriptor(field)?;
        match value.field_type() {
            None => Ok(()),
            Some(_) if descriptor.is_array => Err(TableError::TypeMismatch(format!(
                "field {} holds arrays",
                self.fields[field as usize].name
            ))),
            Some(t) if t == descriptor.field_type => Ok(()),
            Some(t) => Err(TableError::TypeMismatch(format!(
                "field {} is {}, got {}",
                self.fields[field as usize].name, descriptor.field_type, t
            ))),
        }
    }

    /// Grows the table by `count` rows holding NULL in every field.
    pub fn allocate_rows(&self, count: RowIndex) -> Result<(), TableError> {
        let mut state = self.state.write();
        let rows = state
            .rows
            .checked_add(count)
            .ok_or_else(|| TableError::Other("row count overflow".to_string()))?;

        let start = state.rows;
        let TableState { columns, indexes, .. } = &mut *state;

        for (column, index) in columns.iter_mut().zip(indexes.iter_mut()) {
            column.resize(rows as usize, Value::Null);
            if let Some(index) = index {
                index.entry(Value::Null).or_default().extend(start..rows);
            }
        }

        state.rows = rows;
        Ok(())
    }

    /// Appends a row; `values` are given in field order.
    pub fn add_row(&self, values: Vec<Value>) -> Result<RowIndex, TableError> {
        if values.len() != self.fields.len() {
            return Err(TableError::Other(format!(
                "expected {} values, got {}",
                self.fields.len(),
                values.len()
            )));
        }

        for (field, value) in values.iter().enumerate() {
            self.check_value(field as FieldIndex, value)?;
        }

        let mut state = self.state.write();
        let row = state.rows;
        if row == RowIndex::MAX {
            return Err(TableError::Other("row count overflow".to_string()));
        }

        let TableState { columns, indexes, .. } = &mut *state;
        for ((column, index), value) in columns.iter_mut().zip(indexes.iter_mut()).zip(values) {
            if let Some(index) = index {
                index.entry(value.clone()).or_default().push(row);
            }
            column.push(value);
        }

        state.rows = row + 1;
        Ok(row)
    }

    pub fn set_value(&self, row: RowIndex, field: FieldIndex, value: Value) -> Result<(), TableError> {
        self.check_value(field, &value)?;

        let mut state = self.state.write();
        if row >= state.rows {
            return Err(TableError::RowOutOfRange(row));
        }

        let TableState { columns, indexes, .. } = &mut *state;
        let slot = &mut columns[field as usize][row as usize];

        if let Some(index) = &mut indexes[field as usize] {
            if let Some(rows) = index.get_mut(&*slot) {
                rows.retain(|r| *r != row);
                if rows.is_empty() {
                    index.remove(&*slot);
                }
            }
            index.entry(value.clone()).or_default().push(row);
        }

        *slot = value;
        Ok(())
    }

    fn check_bound(&self, field: FieldIndex, bound: &Value) -> Result<(), TableError> {
        let descriptor = self.descriptor(field)?;
        match bound.field_type() {
            Some(t) if t == descriptor.field_type => Ok(()),
            other => Err(TableError::TypeMismatch(format!(
                "bound of type {:?} used on field {} of type {}",
                other, self.fields[field as usize].name, descriptor.field_type
            ))),
        }
    }
}

impl Table for MemoryTable {
    fn retrieve_field(&self, name: &str) -> Result<FieldIndex, TableError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| TableError::FieldNotFound(name.to_string()))
    }

    fn describe_field(&self, field: FieldIndex) -> Result<FieldDescriptor, TableError> {
        self.descriptor(field)
    }

    fn allocated_rows(&self) -> RowIndex {
        self.state.read().rows
    }

    fn is_indexed(&self, field: FieldIndex) -> bool {
        self.state
            .read()
            .indexes
            .get(field as usize)
            .is_some_and(|index| index.is_some())
    }

    fn create_index(
        &self,
        field: FieldIndex,
        mut progress: Option<&mut dyn FnMut(IndexProgress)>,
    ) -> Result<(), TableError> {
        let descriptor = self.descriptor(field)?;
        if descriptor.is_array {
            return Err(TableError::TypeMismatch(format!(
                "array field {} cannot be indexed",
                self.fields[field as usize].name
            )));
        }

        let mut state = self.state.write();
        if state.indexes[field as usize].is_some() {
            return Ok(());
        }

        let column = &state.columns[field as usize];
        let rows_total = column.len() as u64;
        let mut index = FieldIndexMap::new();

        for (row, value) in column.iter().enumerate() {
            index.entry(value.clone()).or_default().push(row as RowIndex);

            if (row + 1) % INDEX_PROGRESS_STEP == 0 {
                if let Some(callback) = progress.as_mut() {
                    callback(IndexProgress {
                        rows_indexed: row as u64 + 1,
                        rows_total,
                    });
                }
            }
        }

        if let Some(callback) = progress.as_mut() {
            callback(IndexProgress {
                rows_indexed: rows_total,
                rows_total,
            });
        }

        info!(
            "Created index on {}.{} ({} rows, {} keys)",
            self.name,
            self.fields[field as usize].name,
            rows_total,
            index.len()
        );

        state.indexes[field as usize] = Some(index);
        Ok(())
    }

    fn match_rows(
        &self,
        min: &Value,
        max: &Value,
        from_row: RowIndex,
        to_row: RowIndex,
        field: FieldIndex,
    ) -> Result<Vec<RowIndex>, TableError> {
        let null_search = min.is_null() && max.is_null();
        if !null_search {
            self.check_bound(field, min)?;
            self.check_bound(field, max)?;
        } else {
            self.descriptor(field)?;
        }

        let (min, max) = if min <= max { (min, max) } else { (max, min) };

        let state = self.state.read();
        if state.rows == 0 || from_row >= state.rows {
            return Ok(Vec::new());
        }

        let to_row = to_row.min(state.rows - 1);
        if from_row > to_row {
            return Ok(Vec::new());
        }

        let in_window = |row: &RowIndex| *row >= from_row && *row <= to_row;

        let rows: Vec<RowIndex> = match &state.indexes[field as usize] {
            Some(index) if null_search => index
                .get(&Value::Null)
                .map(|rows| rows.iter().copied().filter(in_window).collect())
                .unwrap_or_default(),
            Some(index) => index
                .range(min.clone()..=max.clone())
                .flat_map(|(_, rows)| rows.iter().copied())
                .filter(in_window)
                .collect(),
            None => {
                let column = &state.columns[field as usize];
                (from_row..=to_row)
                    .filter(|row| {
                        let value = &column[*row as usize];
                        if null_search {
                            value.is_null()
                        } else {
                            !value.is_null() && value >= min && value <= max
                        }
                    })
                    .collect()
            }
        };

        trace!(
            "match_rows on {}.{}: {} rows in [{}, {}]",
            self.name,
            self.fields[field as usize].name,
            rows.len(),
            from_row,
            to_row
        );

        Ok(rows)
    }

    fn get_value(&self, row: RowIndex, field: FieldIndex) -> Result<Value, TableError> {
        self.descriptor(field)?;
        let state = self.state.read();
        if row >= state.rows {
            return Err(TableError::RowOutOfRange(row));
        }
        Ok(state.columns[field as usize][row as usize].clone())
    }
}
