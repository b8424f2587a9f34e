pub mod field_values;
pub mod rules;
pub mod runner;

pub use field_values::{FieldValues, TableFieldValuesFilter, TypedRange, ValueRange};
pub use rules::FilterRule;
pub use runner::TableFilterRunner;
