pub mod configuration;
pub mod core;

/// Rows a scan rule evaluates per batch.
pub const SCAN_BATCH_SIZE: usize = 1024 * 64;

/// Threads used for batched scans when the configuration sets none.
pub const CONCURRENT_THREADS: usize = 4;

pub use configuration::Configuration;
pub use crate::core::{
    db_type::{FieldDescriptor, FieldType},
    error::{FilterError, TableError},
    filter::{TableFieldValuesFilter, TableFilterRunner},
    range::{Boundable, Interval, Range},
    table::{FieldIndex, RowIndex, Table, memory_table::MemoryTable},
    values::Value,
};
