pub mod buffer;
pub mod entry;
pub mod index;
pub mod metric;
pub mod query;
