use super::{db_type::FieldDescriptor, error::TableError, values::Value};

pub mod memory_table;

pub type RowIndex = u32;
pub type FieldIndex = u32;

/// Reported while an index is being built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexProgress {
    pub rows_indexed: u64,
    pub rows_total: u64,
}

/// Access to a live table, as needed by the filter runner.
///
/// Implementations apply their own locking: every method may be called
/// while other readers are active.
pub trait Table: Sync {
    fn retrieve_field(&self, name: &str) -> Result<FieldIndex, TableError>;

    fn describe_field(&self, field: FieldIndex) -> Result<FieldDescriptor, TableError>;

    /// Number of allocated rows; valid row indexes are `0..allocated_rows()`.
    fn allocated_rows(&self) -> RowIndex;

    fn is_indexed(&self, field: FieldIndex) -> bool;

    fn create_index(
        &self,
        field: FieldIndex,
        progress: Option<&mut dyn FnMut(IndexProgress)>,
    ) -> Result<(), TableError>;

    /// Rows in `[from_row, to_row]` whose value lies in `[min, max]`.
    ///
    /// `min == max == Value::Null` selects the rows holding NULL instead.
    fn match_rows(
        &self,
        min: &Value,
        max: &Value,
        from_row: RowIndex,
        to_row: RowIndex,
        field: FieldIndex,
    ) -> Result<Vec<RowIndex>, TableError>;

    fn get_value(&self, row: RowIndex, field: FieldIndex) -> Result<Value, TableError>;
}
