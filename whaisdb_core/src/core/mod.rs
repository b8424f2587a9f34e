pub mod db_type;
pub mod error;
pub mod filter;
pub mod range;
pub mod table;
pub mod values;
