//! ChronoDB Core - storage, last-value cache, and query planning.
//!
//! This crate provides the engine behind the ChronoDB SQL dialect: a
//! sled-backed row store, a per-table last-value cache, and a planner that
//! decides whether `last()` / `last_row()` / `count()` queries are answered
//! from the cache ("Last Row Scan"), from stored rows ("Table Scan"), or
//! from a fusion of both.

#[cfg(feature = "mimalloc")]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod cache;
pub mod catalog;
pub mod db;
pub mod error;
pub mod query;
pub mod storage;
pub mod value;

pub use cache::{CacheModel, LastCache};
pub use catalog::{Catalog, ColumnDef, ColumnType, StableDef, TableDef, TableId, TableSchema};
pub use db::{Database, Engine, Session};
pub use error::Error;
pub use query::{PhysicalPlan, PlanNode, ResultSet};
pub use storage::{RowStore, StoreConfig};
pub use value::Value;

/// Re-export the SQL dialect crate.
pub use chronodb_lang as lang;
