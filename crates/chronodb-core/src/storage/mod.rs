//! Storage layer for ChronoDB.
//!
//! This module provides a sled-based row store keyed by (table id,
//! timestamp); it is the data source for the planner's Table Scan path.

mod codec;
mod config;
mod engine;

pub mod key;

pub use codec::{decode_row, encode_row};
pub use config::StoreConfig;
pub use engine::RowStore;
pub use key::RowKey;
