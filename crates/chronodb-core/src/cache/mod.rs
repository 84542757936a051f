//! Last-value cache: per-table last row and last non-null value per column.

mod entry;
mod model;
mod store;

pub use entry::{CacheEntry, CachedRow, CachedValue};
pub use model::CacheModel;
pub use store::LastCache;
