//! Schema metadata: column/table definitions and the per-database catalog.

mod catalog;
mod schema;

pub use catalog::Catalog;
pub use schema::{ColumnDef, ColumnType, StableDef, TableDef, TableId, TableSchema};
